//! Topokit Error Types
//!
//! Fatal kinds (`Bind`, `Connect`, `Send`, `Receive`, ...) abort the owning
//! driver; `Timeout` is a control signal.

use crate::protocol::Protocol;
use std::io;
use thiserror::Error;

/// Main error type for socket operations
#[derive(Error, Debug)]
pub enum Error {
    /// Listening failed: malformed address or address in use
    #[error("Bind to {endpoint} failed: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Dialing failed: malformed address or unreachable listener
    #[error("Connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// Message could not be handed to the transport
    #[error("Send failed: {0}")]
    Send(String),

    /// Transport failure while receiving
    #[error("Receive failed: {0}")]
    Receive(String),

    /// Receive deadline (or survey window) elapsed
    #[error("Operation timed out")]
    Timeout,

    /// Operation on a closed socket
    #[error("Socket closed")]
    Closed,

    /// Operation not valid for the protocol or its current state
    #[error("{protocol} socket: {reason}")]
    BadState {
        protocol: Protocol,
        reason: &'static str,
    },

    /// Option not meaningful for this protocol
    #[error("Option {option} is not supported by {protocol} sockets")]
    UnsupportedOption {
        option: &'static str,
        protocol: Protocol,
    },

    /// Wire greeting violation or incompatible peer
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for socket operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bind error for an endpoint
    pub fn bind(endpoint: impl Into<String>, source: impl Into<io::Error>) -> Self {
        Self::Bind {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Create a connect error for an endpoint
    pub fn connect(endpoint: impl Into<String>, source: impl Into<io::Error>) -> Self {
        Self::Connect {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// Create a send error with a message
    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }

    /// Create a receive error with a message
    pub fn receive(msg: impl Into<String>) -> Self {
        Self::Receive(msg.into())
    }

    /// Create a protocol error with a message
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Check if this is the non-fatal deadline signal
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if this error must abort the owning driver
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_not_fatal() {
        assert!(Error::Timeout.is_timeout());
        assert!(!Error::Timeout.is_fatal());
        assert!(Error::send("no peer").is_fatal());
        assert!(Error::Closed.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = Error::connect(
            "tcp://127.0.0.1:1",
            io::Error::from(io::ErrorKind::ConnectionRefused),
        );
        assert!(err.to_string().starts_with("Connect to tcp://127.0.0.1:1 failed"));
        assert!(err.is_fatal());

        let err = Error::BadState {
            protocol: Protocol::Pub,
            reason: "cannot receive",
        };
        assert_eq!(err.to_string(), "PUB socket: cannot receive");
    }
}
