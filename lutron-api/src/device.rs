//! Defines the view a light adapter has of a device on the lighting
//! bus.
//!
//! The bus client owns the connection to the lighting controller and
//! the state of every output it discovered. It hands out `Output`
//! handles which the adapter uses to read and write a single output.
//! How a handle talks to the hardware is up to the client.

use crate::Result;
use std::fmt;

/// A handle to one output (load) on the lighting bus.
///
/// Levels are in the controller's native scale: 0.0 is off and 100.0
/// is full-on. Any communication failure is reported through the
/// returned `Result`; callers propagate it and don't retry.

pub trait Output: fmt::Display {
    /// Returns the last level the controller confirmed for the
    /// output.
    fn last_level(&self) -> Result<f64>;

    /// Returns the level the output was last told to go to. This may
    /// differ from `last_level()` until the controller confirms the
    /// change.
    fn level(&self) -> Result<f64>;

    /// Requests the output go to `level`.
    fn set_level(&mut self, level: f64) -> Result<()>;

    /// Returns `true` if the output drives a dimmer (rather than a
    /// switched load.)
    fn is_dimmable(&self) -> bool;

    /// The integration ID assigned to the output by the controller's
    /// configuration. It never changes.
    fn id(&self) -> u32;

    /// The name given to the output in the controller's
    /// configuration.
    fn name(&self) -> &str;
}

/// Implemented by bus clients that can report the outputs they found
/// on the controller.

pub trait Controller {
    type Output: Output;

    /// Returns every output that should be presented as a light,
    /// paired with the name of the area it's in.
    fn lights(&self) -> Result<Vec<(String, Self::Output)>>;
}
