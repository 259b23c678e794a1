//! SUB socket implementation
//!
//! Receives from every attached PUB socket and delivers only messages that
//! start with one of the subscribed prefixes. A fresh SUB socket has no
//! subscriptions and therefore delivers nothing; subscribe to the empty
//! prefix to receive everything.

use crate::base::SocketBase;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::subscription::SubscriptionSet;
use topokit_core::Result;
use tracing::{debug, trace};

/// Prefix-filtering subscriber.
pub struct SubSocket {
    base: SocketBase,
    subscriptions: SubscriptionSet,
}

impl SubSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Sub, options),
            subscriptions: SubscriptionSet::new(),
        }
    }

    /// Accept messages starting with `prefix` (empty = everything).
    pub fn subscribe(&mut self, prefix: impl Into<Bytes>) {
        let prefix = prefix.into();
        debug!("[SUB] Subscribing to {:?}", prefix);
        self.subscriptions.subscribe(prefix);
    }

    /// Stop accepting messages for `prefix`.
    pub fn unsubscribe(&mut self, prefix: &[u8]) {
        debug!("[SUB] Unsubscribing from {:?}", Bytes::copy_from_slice(prefix));
        self.subscriptions.unsubscribe(prefix);
    }

    /// Always fails: SUB sockets cannot send.
    pub async fn send(&mut self, _msg: Bytes) -> Result<()> {
        self.base.ensure_open()?;
        Err(self.base.bad_state("cannot send"))
    }

    /// Next message matching a subscription.
    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        loop {
            let inbound = self.base.recv_inbound(deadline).await?;
            if self.subscriptions.matches(&inbound.msg) {
                return Ok(inbound.msg);
            }
            trace!("[SUB] Filtered out {} bytes", inbound.msg.len());
        }
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        match option {
            SocketOption::Subscribe(prefix) => {
                self.subscribe(prefix);
                Ok(())
            }
            SocketOption::Unsubscribe(prefix) => {
                self.unsubscribe(&prefix);
                Ok(())
            }
            other => self.base.set_option(other),
        }
    }
}

impl Default for SubSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(SubSocket);
