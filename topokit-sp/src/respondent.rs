//! RESPONDENT socket implementation
//!
//! Receives survey queries and answers each one on the pipe it came from,
//! echoing the survey id so the surveyor can match it to its round.

use crate::base::SocketBase;
use crate::header;
use crate::peer::PipeId;
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::Result;
use tracing::trace;

/// Survey responder.
pub struct RespondentSocket {
    base: SocketBase,
    /// Survey awaiting our answer
    pending: Option<(PipeId, u32)>,
}

impl RespondentSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Respondent, options),
            pending: None,
        }
    }

    /// Receive the next survey query.
    pub async fn recv(&mut self) -> Result<Bytes> {
        let deadline = self.base.recv_deadline();
        loop {
            let inbound = self.base.recv_inbound(deadline).await?;
            if let Some((id, body)) = header::split(inbound.msg) {
                trace!("[RESPONDENT] Survey {:#010x} from pipe {}", id, inbound.pipe);
                self.pending = Some((inbound.pipe, id));
                return Ok(body);
            }
            trace!("[RESPONDENT] Dropping query without header");
        }
    }

    /// Answer the last received survey.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        self.base.ensure_open()?;
        let Some((pipe, id)) = self.pending.take() else {
            return Err(self.base.bad_state("no survey to respond to"));
        };
        self.base.send_to(pipe, header::prepend(id, &msg))
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        self.base.set_option(option)
    }
}

impl Default for RespondentSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(RespondentSocket);
