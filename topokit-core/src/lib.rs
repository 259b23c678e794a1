//! Topokit Core
//!
//! This crate contains the transport-agnostic building blocks shared by every
//! topokit socket:
//! - Endpoint addressing (`endpoint`)
//! - Error taxonomy (`error`)
//! - Socket options and the typed `setOption` surface (`options`)
//! - Protocol identities and peer compatibility (`protocol`)
//! - SUB prefix matching (`subscription`)
//! - SP greeting + length-prefixed framing, sans-IO (`frame`)
//! - In-process endpoint registry (`inproc`)
//! - TCP tuning (`tcp`) and dial backoff (`reconnect`)

// The tcp module needs raw fd/socket access for socket configuration
#![cfg_attr(not(test), deny(unsafe_code))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod endpoint;
pub mod error;
pub mod frame;
pub mod inproc;
pub mod options;
pub mod protocol;
pub mod reconnect;
pub mod subscription;
pub mod tcp;

pub use error::{Error, Result};

// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::endpoint::Endpoint;
    pub use crate::error::{Error, Result};
    pub use crate::options::{SocketOption, SocketOptions};
    pub use crate::protocol::Protocol;
    pub use crate::reconnect::ReconnectState;
    pub use crate::subscription::SubscriptionSet;
}
