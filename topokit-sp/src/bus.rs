//! BUS socket implementation
//!
//! Every node is both sender and receiver: a send reaches all directly
//! attached peers, and `recv` returns messages from any of them. Messages are
//! not forwarded, so a full mesh needs every node to dial (or be dialed by)
//! every other node. A BUS socket may listen and dial any number of times.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Mesh member.
pub struct BusSocket {
    base: SocketBase,
}

impl BusSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Bus, options),
        }
    }

    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        trace!("[BUS] Sending {} bytes to {} peers", msg.len(), self.base.peer_count());
        self.base.broadcast(&msg)
    }

    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        Ok(self.base.recv_inbound(deadline).await?.msg)
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for BusSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(BusSocket);
