//! PULL socket implementation
//!
//! Receive-only end of a pipeline, fair-queued across every connected PUSH
//! socket.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Pipeline receiver.
pub struct PullSocket {
    base: SocketBase,
}

impl PullSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Pull, options),
        }
    }

    /// Always fails: PULL sockets cannot send.
    pub async fn send(&mut self, _msg: Bytes) -> Result<()> {
        self.base.ensure_open()?;
        Err(self.base.bad_state("cannot send"))
    }

    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        let inbound = self.base.recv_inbound(deadline).await?;
        trace!("[PULL] Received {} bytes from pipe {}", inbound.msg.len(), inbound.pipe);
        Ok(inbound.msg)
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for PullSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(PullSocket);
