//! Defines fundamental types used throughout the codebase.

use std::fmt;
use std::sync::PoisonError;

/// Enumerates all the errors that can be reported by a bus client or
/// the light adapter. Authors of new bus clients should try to map
/// their errors into one of these values. Use the associated
/// description string to explain the details.

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// Returned whenever a resource cannot be found.
    NotFound,

    /// Reported when the peer of a communication channel (usually
    /// the lighting controller) has gone away.
    MissingPeer(String),

    /// The requested operation couldn't complete. The description
    /// field will have more information for the user.
    OperationError(String),

    /// A bad parameter was given in a configuration or a
    /// configuration was missing a required parameter.
    ConfigError(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "item not found"),
            Error::MissingPeer(detail) => {
                write!(f, "{} is missing peer", detail)
            }
            Error::OperationError(v) => {
                write!(f, "couldn't complete operation: {}", &v)
            }
            Error::ConfigError(v) => write!(f, "config error: {}", &v),
        }
    }
}

// Outputs that share their state behind a `Mutex` can use `?` on the
// lock and have a poisoned lock reported as a failed operation.

impl<T> From<PoisonError<T>> for Error {
    fn from(_error: PoisonError<T>) -> Self {
        Error::OperationError(String::from("output state lock is poisoned"))
    }
}
