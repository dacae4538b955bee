// A controller that lives in memory. It stands in for a connection
// to a real Lutron processor: every output configured for it is
// reported as a light and the "hardware" confirms a new level as
// soon as it's set.

use lutron_api::{
    device::{Controller, Output},
    Error, Result,
};
use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex},
};
use tracing::debug;

pub mod config;

// The part of an output that changes. It's shared between the
// controller and every handle to the output.

#[derive(Debug)]
struct Levels {
    level: f64,
    last_level: f64,
}

#[derive(Clone)]
pub struct MemoryOutput {
    id: u32,
    name: Arc<str>,
    dimmable: bool,
    levels: Arc<Mutex<Levels>>,
}

impl MemoryOutput {
    fn new(entry: &config::Entry) -> Self {
        MemoryOutput {
            id: entry.id,
            name: entry.name.as_str().into(),
            dimmable: entry.dimmable,
            levels: Arc::new(Mutex::new(Levels {
                level: entry.level,
                last_level: entry.level,
            })),
        }
    }
}

impl fmt::Display for MemoryOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "output {} ({})", self.id, &self.name)
    }
}

impl Output for MemoryOutput {
    fn last_level(&self) -> Result<f64> {
        Ok(self.levels.lock()?.last_level)
    }

    fn level(&self) -> Result<f64> {
        Ok(self.levels.lock()?.level)
    }

    fn set_level(&mut self, level: f64) -> Result<()> {
        let mut levels = self.levels.lock()?;

        levels.level = level;
        levels.last_level = level;
        Ok(())
    }

    fn is_dimmable(&self) -> bool {
        self.dimmable
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub struct Memory {
    outputs: Vec<(String, MemoryOutput)>,
}

impl Memory {
    pub const NAME: &'static str = "memory";

    /// Builds the controller's outputs from the configuration.
    /// Integration IDs have to be unique and initial levels have to
    /// be in the range 0.0..=100.0.
    pub fn create(cfg: &config::Params) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut outputs = vec![];

        for e in cfg.outputs.iter() {
            if !ids.insert(e.id) {
                return Err(Error::ConfigError(format!(
                    "integration ID {} is used more than once",
                    e.id
                )));
            }

            if !(0.0..=100.0).contains(&e.level) {
                return Err(Error::ConfigError(format!(
                    "level of output {} must be between 0.0 and 100.0",
                    e.id
                )));
            }

            debug!(
                "adding output {} ('{}') to area '{}'",
                e.id, &e.name, &e.area
            );
            outputs.push((e.area.clone(), MemoryOutput::new(e)))
        }

        Ok(Memory { outputs })
    }
}

impl Controller for Memory {
    type Output = MemoryOutput;

    fn lights(&self) -> Result<Vec<(String, MemoryOutput)>> {
        Ok(self.outputs.clone())
    }
}
