//! PUSH socket implementation
//!
//! Send-only end of a pipeline. Each message goes to exactly one connected
//! PULL socket, chosen round-robin.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Load-balancing pipeline sender.
pub struct PushSocket {
    base: SocketBase,
}

impl PushSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Push, options),
        }
    }

    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        trace!("[PUSH] Sending {} bytes", msg.len());
        self.base.send_one(msg).await
    }

    /// Always fails: PUSH sockets cannot receive.
    pub async fn recv(&mut self) -> Result<Bytes> {
        self.base.ensure_open()?;
        Err(self.base.bad_state("cannot receive"))
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for PushSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(PushSocket);
