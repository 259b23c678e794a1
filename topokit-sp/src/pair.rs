//! PAIR socket implementation
//!
//! A PAIR socket talks to exactly one peer. Both directions are allowed and
//! message order is preserved. Further connections are refused while a peer
//! is attached.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Exclusive bidirectional socket.
pub struct PairSocket {
    base: SocketBase,
}

impl PairSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Pair, options),
        }
    }

    /// Send to the peer, waiting for one up to the send deadline.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        trace!("[PAIR] Sending {} bytes", msg.len());
        self.base.send_one(msg).await
    }

    /// Receive the next message from the peer.
    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        Ok(self.base.recv_inbound(deadline).await?.msg)
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for PairSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(PairSocket);
