//! Represents how configuration information is given to a bus
//! client. Since each client can have vastly different requirements,
//! the config structure needs to be as general as possible. A
//! `DriverConfig` type is a map with `String` keys and `toml::Value`
//! values.

use crate::{types::Error, Result};
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use std::ops::Deref;
use toml::value::{Table, Value};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DriverConfig(Table);

impl DriverConfig {
    /// Return a reference to the underlying toml::Value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Converts the table into the client's own parameter type.
    pub fn parse_into<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Value::Table(self.0.clone()).try_into().map_err(|e| {
            Error::ConfigError(format!("config parse error: {}", e))
        })
    }
}

impl From<Table> for DriverConfig {
    fn from(t: Table) -> Self {
        DriverConfig(t)
    }
}

impl From<DriverConfig> for Table {
    fn from(dc: DriverConfig) -> Self {
        dc.0
    }
}

impl Deref for DriverConfig {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.0
    }
}
