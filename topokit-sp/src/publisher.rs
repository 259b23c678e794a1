//! PUB socket implementation
//!
//! Every message is copied to every attached SUB socket. Subscribers filter
//! on their side; a subscriber that attaches after a send never sees it.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Broadcasting publisher.
pub struct PubSocket {
    base: SocketBase,
}

impl PubSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Pub, options),
        }
    }

    /// Publish to all current subscribers. Never waits for a peer.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        trace!("[PUB] Publishing {} bytes to {} subscribers", msg.len(), self.base.peer_count());
        self.base.broadcast(&msg)
    }

    /// Always fails: PUB sockets cannot receive.
    pub async fn recv(&mut self) -> Result<Bytes> {
        self.base.ensure_open()?;
        Err(self.base.bad_state("cannot receive"))
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for PubSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(PubSocket);
