//! This crate is shared by the Lutron light adapter and the process
//! that hosts it.
//!
//! The interfaces and types defined here are what a new bus client
//! needs to implement so its outputs can be driven by the light
//! adapter in `lutron-drv-light`.

mod types;

// Pull types down to the `lutron-api` namespace.

pub use types::Error;

/// A specialization of `std::result::Result<>` where the error value
/// is `types::Error`.

pub type Result<T> = std::result::Result<T, Error>;

pub mod device;
pub mod driver;
