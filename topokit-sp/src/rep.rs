//! REP socket implementation
//!
//! `recv` yields the next request and remembers where it came from; `send`
//! answers that request on the originating pipe. A request that is never
//! answered is simply replaced by the next one.

use crate::base::SocketBase;
use crate::header;
use crate::peer::PipeId;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// REP socket state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepState {
    /// Waiting to receive a request
    AwaitingRequest,
    /// Request received; a reply goes back to this pipe with this id
    ReadyToReply { pipe: PipeId, id: u32 },
}

/// Replier socket.
pub struct RepSocket {
    base: SocketBase,
    state: RepState,
}

impl RepSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Rep, options),
            state: RepState::AwaitingRequest,
        }
    }

    /// Receive the next request.
    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        loop {
            let inbound = self.base.recv_inbound(deadline).await?;
            let Some((id, body)) = header::split(inbound.msg) else {
                trace!("[REP] Dropping request without header from pipe {}", inbound.pipe);
                continue;
            };
            trace!("[REP] Request {:#010x} from pipe {}", id, inbound.pipe);
            self.state = RepState::ReadyToReply {
                pipe: inbound.pipe,
                id,
            };
            return Ok(body);
        }
    }

    /// Reply to the last received request.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        self.base.ensure_open()?;
        let RepState::ReadyToReply { pipe, id } = self.state else {
            return Err(self.base.bad_state("no request to reply to"));
        };
        self.state = RepState::AwaitingRequest;
        self.base.send_to(pipe, header::prepend(id, &msg))
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for RepSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(RepSocket);

#[cfg(test)]
mod tests {
    use super::*;
    use topokit_core::Error;

    #[compio::test]
    async fn test_send_before_recv_is_bad_state() {
        let mut rep = RepSocket::new();
        let err = rep.send(Bytes::from_static(b"early")).await.unwrap_err();
        assert!(matches!(err, Error::BadState { protocol: Protocol::Rep, .. }));
    }
}
