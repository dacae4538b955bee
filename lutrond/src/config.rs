use serde_derive::Deserialize;
use std::env;
use tokio::time::Duration;
use tracing::Level;

use lutron_api::driver::DriverConfig;

const DEF_POLL_INTERVAL: u64 = 5;

#[derive(Deserialize, Default)]
pub struct Config {
    log_level: Option<String>,
    poll_interval: Option<u64>,
    #[serde(default)]
    pub controller: Controller,
}

impl Config {
    pub fn get_log_level(&self) -> Level {
        let v = self.log_level.as_deref().unwrap_or("warn");

        match v {
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        }
    }

    // A zero interval would make the poll timer panic, so the
    // shortest interval is one second.

    pub fn get_poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval.unwrap_or(DEF_POLL_INTERVAL).max(1),
        )
    }
}

fn def_controller() -> String {
    String::from("memory")
}

#[derive(Deserialize)]
pub struct Controller {
    #[serde(default = "def_controller")]
    pub name: String,
    pub cfg: Option<DriverConfig>,
}

impl Default for Controller {
    fn default() -> Self {
        Controller {
            name: def_controller(),
            cfg: None,
        }
    }
}

// Options given on the command line.

struct Args {
    config: Option<String>,
    verbose: u8,
    print_cfg: bool,
}

fn from_cmdline() -> Args {
    use clap::{crate_version, Arg, ArgAction, Command};

    // Define the command line arguments.

    let matches = Command::new("Lutron Light Host")
        .version(crate_version!())
        .about("Presents Lutron outputs as dimmable lights.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Specifies the configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Sets verbosity of log; can be used more than once")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("print_cfg")
                .long("print-config")
                .help("Displays the configuration and exits")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    Args {
        config: matches.get_one::<String>("config").cloned(),
        verbose: matches.get_count("verbose"),
        print_cfg: matches.get_flag("print_cfg"),
    }
}

// The number of '-v' options determines the log level. With no '-v'
// options, the level from the config file is used.

fn apply_verbosity(mut cfg: Config, verbose: u8) -> Config {
    match verbose {
        0 => (),
        1 => cfg.log_level = Some(String::from("info")),
        2 => cfg.log_level = Some(String::from("debug")),
        _ => cfg.log_level = Some(String::from("trace")),
    };
    cfg
}

fn parse_config(path: &str, contents: &str) -> Option<Config> {
    match toml::from_str(contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            print!("ERROR: {},\n       ignoring {}\n", e, path);
            None
        }
    }
}

async fn from_file(path: &str) -> Option<Config> {
    use tokio::fs;

    if let Ok(contents) = fs::read(path).await {
        let contents = String::from_utf8_lossy(&contents);

        parse_config(path, &contents)
    } else {
        None
    }
}

async fn find_cfg() -> Config {
    const CFG_FILE: &str = "lutron.toml";

    // Create a vector of directories that could contain a
    // configuration file. The directories will be searched in their
    // order within the vector.

    let mut dirs = vec![String::from("./")];

    // If the user has `HOME` defined, append their home directory to
    // the search path. The trailing period makes the file
    // `.lutron.toml` in the home directory.

    if let Ok(home) = env::var("HOME") {
        dirs.push(format!("{}/.", home))
    }

    // Add other, common configuration areas.

    dirs.push(String::from("/usr/local/etc/"));
    dirs.push(String::from("/usr/pkg/etc/"));
    dirs.push(String::from("/etc/"));

    // Iterate through the directories. The first file that is found
    // and can be parsed is used as the configuration.

    for dir in dirs {
        let file = format!("{}{}", &dir, CFG_FILE);

        if let Some(cfg) = from_file(&file).await {
            return cfg;
        }
    }
    Config::default()
}

fn dump_config(cfg: &Config) {
    println!("Configuration:");
    println!("    log level: {}", cfg.get_log_level());
    println!(
        "    poll interval: {} seconds\n",
        cfg.get_poll_interval().as_secs()
    );

    println!("Controller configuration:");
    println!(
        "    name: {}\n    cfg: {}",
        &cfg.controller.name,
        cfg.controller
            .cfg
            .as_ref()
            .map(|c| toml::Value::Table(c.clone().into()).to_string())
            .unwrap_or_default()
    );
}

#[tracing::instrument(name = "loading config")]
pub async fn get() -> Option<Config> {
    let args = from_cmdline();

    // A configuration file given on the command line has to exist
    // and be valid. Otherwise search the usual places.

    let cfg = if let Some(path) = &args.config {
        match from_file(path).await {
            Some(cfg) => cfg,
            None => {
                println!("ERROR: couldn't load configuration from {}", path);
                return None;
            }
        }
    } else {
        find_cfg().await
    };
    let cfg = apply_verbosity(cfg, args.verbose);

    if args.print_cfg {
        dump_config(&cfg);
        None
    } else {
        Some(cfg)
    }
}
