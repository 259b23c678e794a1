//! SURVEYOR socket implementation
//!
//! `send` starts a survey: the query goes to every attached respondent and a
//! window of `survey_time` opens. `recv` returns replies to the current
//! survey until the window closes, then fails with `Error::Timeout` and ends
//! the survey. Replies to older surveys, or arriving after the window, are
//! dropped.

use crate::base::SocketBase;
use crate::header::{self, IdSequence};
use crate::socket_trait::impl_socket_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use topokit_core::options::{SocketOption, SocketOptions};
use topokit_core::protocol::Protocol;
use topokit_core::{Error, Result};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
struct Survey {
    id: u32,
    deadline: Instant,
}

/// Scatter/gather originator.
pub struct SurveyorSocket {
    base: SocketBase,
    ids: IdSequence,
    current: Option<Survey>,
}

impl SurveyorSocket {
    pub fn new() -> Self {
        Self::with_options(SocketOptions::default())
    }

    pub fn with_options(options: SocketOptions) -> Self {
        Self {
            base: SocketBase::new(Protocol::Surveyor, options),
            ids: IdSequence::new(),
            current: None,
        }
    }

    /// Current survey window.
    pub fn survey_time(&self) -> Duration {
        self.base.options.survey_time
    }

    /// Broadcast a query and open a new survey window.
    pub async fn send(&mut self, msg: Bytes) -> Result<()> {
        self.base.ensure_open()?;
        let id = self.ids.next_id();
        let deadline = Instant::now() + self.base.options.survey_time;
        self.base.broadcast(&header::prepend(id, &msg))?;
        debug!(
            "[SURVEYOR] Survey {:#010x} sent to {} respondents",
            id,
            self.base.peer_count()
        );
        self.current = Some(Survey { id, deadline });
        Ok(())
    }

    /// Next reply to the current survey, or `Timeout` once its window closes.
    ///
    /// A receive deadline shorter than the window also yields `Timeout`, but
    /// leaves the survey open; [`in_survey`](Self::in_survey) tells the two apart.
    pub async fn recv(&mut self) -> Result<Bytes> {
        self.base.ensure_open()?;
        let Some(survey) = self.current else {
            return Err(self.base.bad_state("no survey in progress"));
        };

        let deadline = match self.base.recv_deadline() {
            Some(recv_deadline) if recv_deadline < survey.deadline => recv_deadline,
            _ => survey.deadline,
        };

        loop {
            if Instant::now() >= survey.deadline {
                return Err(self.finish(survey));
            }
            let inbound = match self.base.recv_inbound(Some(deadline)).await {
                Ok(inbound) => inbound,
                Err(Error::Timeout) if Instant::now() >= survey.deadline => {
                    return Err(self.finish(survey));
                }
                Err(e) => return Err(e),
            };
            if Instant::now() >= survey.deadline {
                trace!("[SURVEYOR] Reply from pipe {} missed the deadline", inbound.pipe);
                return Err(self.finish(survey));
            }
            match header::split(inbound.msg) {
                Some((id, body)) if id == survey.id => return Ok(body),
                Some((id, _)) => trace!("[SURVEYOR] Dropping reply to old survey {:#010x}", id),
                None => trace!("[SURVEYOR] Dropping reply without header"),
            }
        }
    }

    fn finish(&mut self, survey: Survey) -> Error {
        debug!("[SURVEYOR] Survey {:#010x} window closed", survey.id);
        self.current = None;
        Error::Timeout
    }

    /// Whether a survey window is open.
    pub fn in_survey(&self) -> bool {
        self.current
            .is_some_and(|survey| Instant::now() < survey.deadline)
    }

    pub fn set_option(&mut self, option: SocketOption) -> Result<()> {
        match option {
            SocketOption::SurveyTime(window) => {
                self.base.options.survey_time = window;
                Ok(())
            }
            other => self.base.set_option(other),
        }
    }
}

impl Default for SurveyorSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl_socket_trait!(SurveyorSocket);

#[cfg(test)]
mod tests {
    use super::*;

    #[compio::test]
    async fn test_recv_without_survey_is_bad_state() {
        let mut surveyor = SurveyorSocket::new();
        assert!(matches!(
            surveyor.recv().await,
            Err(Error::BadState { protocol: Protocol::Surveyor, .. })
        ));
    }

    #[compio::test]
    async fn test_empty_survey_times_out() {
        let mut surveyor = SurveyorSocket::with_options(
            SocketOptions::default().with_survey_time(Duration::from_millis(50)),
        );
        let start = Instant::now();
        surveyor.send(Bytes::from_static(b"DATE")).await.unwrap();
        assert!(surveyor.in_survey());

        assert!(matches!(surveyor.recv().await, Err(Error::Timeout)));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(!surveyor.in_survey());

        // The survey is over
        assert!(matches!(surveyor.recv().await, Err(Error::BadState { .. })));
    }
}
