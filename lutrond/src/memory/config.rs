use lutron_api::{driver::DriverConfig, Error};
use serde_derive::Deserialize;

fn def_dimmable() -> bool {
    true
}

// Describes one output of the simulated controller.

#[derive(Deserialize, Debug, PartialEq)]
pub struct Entry {
    pub area: String,
    pub name: String,
    pub id: u32,
    #[serde(default = "def_dimmable")]
    pub dimmable: bool,
    #[serde(default)]
    pub level: f64,
}

#[derive(Deserialize, Debug, PartialEq)]
pub struct Params {
    #[serde(default)]
    pub outputs: Vec<Entry>,
}

impl TryFrom<DriverConfig> for Params {
    type Error = Error;

    fn try_from(cfg: DriverConfig) -> std::result::Result<Self, Self::Error> {
        cfg.parse_into()
    }
}
