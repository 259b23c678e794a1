//! REQ socket implementation
//!
//! One request at a time: `send` tags the payload with a fresh request id and
//! `recv` waits for the reply carrying that id. Replies to earlier requests
//! are discarded. Sending again abandons the outstanding request.

use crate::base::SocketBase;
use crate::header::{self, IdSequence};
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::{debug, trace};

/// Requester socket.
pub struct ReqSocket {
    base: SocketBase,
    ids: IdSequence,
    /// Id of the request awaiting a reply
    outstanding: Option<u32>,
}

impl ReqSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Req, options),
            ids: IdSequence::new(),
            outstanding: None,
        }
    }

    /// Send a request to one REP peer.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        let id = self.ids.next_id();
        if let Some(old) = self.outstanding.take() {
            debug!("[REQ] Abandoning request {:#010x}", old);
        }
        self.base.send_one(header::prepend(id, &msg)).await?;
        trace!("[REQ] Request {:#010x} sent", id);
        self.outstanding = Some(id);
        Ok(())
    }

    /// Wait for the reply to the outstanding request.
    pub async fn recv(&mut self) -> Result<Bytes> {
        self.base.ensure_open()?;
        let Some(expected) = self.outstanding else {
            return Err(self.base.bad_state("no outstanding request"));
        };

        let deadline = self.base.recv_deadline();
        loop {
            let inbound = self.base.recv_inbound(deadline).await?;
            match header::split(inbound.msg) {
                Some((id, body)) if id == expected => {
                    self.outstanding = None;
                    return Ok(body);
                }
                Some((id, _)) => trace!("[REQ] Dropping stale reply {:#010x}", id),
                None => trace!("[REQ] Dropping reply without header from pipe {}", inbound.pipe),
            }
        }
    }

    /// Whether a request is waiting for its reply.
    pub fn has_outstanding(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for ReqSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(ReqSocket);
