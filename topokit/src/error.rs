//! Driver-level errors.

use thiserror::Error;

/// Why a driver stopped with a failure.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A fatal socket error (bind, connect, send, receive, ...)
    #[error(transparent)]
    Socket(#[from] topokit_core::Error),

    /// Unknown topology or role, or missing arguments
    #[error("usage: {0}")]
    Usage(String),
}

impl DriverError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
