use lutron_api::{Error, Result};
use lutron_drv_light::setup_platform;
use tracing::{error, info, trace, warn};

mod config;
mod memory;
mod platform;

// Initializes the `lutrond` application. It determines the
// configuration and sets up the logger. It returns `Some(Config)`
// with the found configuration, if the application is to run. It
// returns `None` if the program should exit (because a command line
// option asked for the configuration to be printed, for instance.)

async fn init_app() -> Option<config::Config> {
    // If a configuration is returned, set up the logger.

    if let Some(cfg) = config::get().await {
        // Initialize the log system. The max log level is determined
        // by the user (either through the config file or the command
        // line.)

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(cfg.get_log_level())
            .with_target(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Unable to set global default subscriber");
        Some(cfg)
    } else {
        None
    }
}

// Creates the controller named in the configuration. Only the
// in-memory controller is available.

fn build_controller(cfg: &config::Controller) -> Result<memory::Memory> {
    if cfg.name == memory::Memory::NAME {
        let params: memory::config::Params =
            cfg.cfg.clone().unwrap_or_default().try_into()?;

        memory::Memory::create(&params)
    } else {
        error!("no controller named {}", &cfg.name);
        Err(Error::NotFound)
    }
}

// Runs the main body of the application. It reads the config, sets
// up the lights and then refreshes them on every tick of the poll
// timer until the process is interrupted.

async fn run() -> Result<()> {
    if let Some(cfg) = init_app().await {
        let controller = build_controller(&cfg.controller)?;
        let lights = setup_platform(&controller)?;
        let mut platform = platform::Platform::new(lights);

        if platform.is_empty() {
            warn!("no lights were configured");
        } else {
            info!("set up {} light(s)", platform.len());
        }

        let mut timer = tokio::time::interval(cfg.get_poll_interval());

        loop {
            #[rustfmt::skip]
            tokio::select! {
                _ = timer.tick() => {
                    trace!("polling lights");
                    platform.poll();
                }

                _ = tokio::signal::ctrl_c() => break
            }
        }

        warn!("shutting down")
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {:?}", e)
    }
}
