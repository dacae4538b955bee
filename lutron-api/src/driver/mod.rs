//! Defines types that a bus client and its host share when setting
//! up a controller.

mod config;

pub use config::DriverConfig;
