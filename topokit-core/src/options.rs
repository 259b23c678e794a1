//! Socket configuration options
//!
//! `SocketOptions` is the per-socket configuration, built with `with_*`
//! methods. `SocketOption` is the typed form of a single `setOption(name,
//! value)` call made on a live socket.

use bytes::Bytes;
use std::time::Duration;

/// Default inbound message limit (1 MiB).
pub const DEFAULT_MAX_MSG_SIZE: usize = 1024 * 1024;

/// Socket configuration options.
///
/// # Examples
///
/// ```
/// use topokit_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_recv_timeout(Duration::from_millis(100))
///     .with_survey_time(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// Receive deadline
    ///
    /// Bounds a single `recv()` call.
    /// - `None`: Block until a message arrives (default)
    /// - `Some(Duration::ZERO)`: Return a queued message or time out at once
    /// - `Some(duration)`: Wait up to duration before returning `Timeout`
    pub recv_timeout: Option<Duration>,

    /// Send deadline
    ///
    /// Bounds how long a single-destination send waits for a peer to attach.
    /// - `None`: Wait indefinitely (default)
    /// - `Some(duration)`: Fail with `Send` once duration elapses
    pub send_timeout: Option<Duration>,

    /// Survey window
    ///
    /// How long a SURVEYOR accepts replies to the most recent query.
    /// - Default: 1 second
    pub survey_time: Duration,

    /// Handshake timeout
    ///
    /// Maximum time to exchange the SP greeting after a TCP connection.
    /// - Default: 10 seconds
    pub handshake_timeout: Duration,

    /// Maximum inbound message size in bytes.
    ///
    /// Larger frames drop the offending pipe. Default: 1 MiB.
    pub max_msg_size: usize,

    /// Initial delay between dial attempts.
    /// - Default: 100ms
    pub reconnect_ivl: Duration,

    /// Maximum delay between dial attempts for exponential backoff.
    /// - Default: 0 (no maximum)
    pub reconnect_ivl_max: Duration,

    /// Number of connection attempts made by `dial()`.
    /// - Default: 1 (fail on the first refusal)
    pub dial_attempts: u32,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            recv_timeout: None,
            send_timeout: None,
            survey_time: Duration::from_secs(1),
            handshake_timeout: Duration::from_secs(10),
            max_msg_size: DEFAULT_MAX_MSG_SIZE,
            reconnect_ivl: Duration::from_millis(100),
            reconnect_ivl_max: Duration::ZERO,
            dial_attempts: 1,
        }
    }
}

impl SocketOptions {
    /// Create new socket options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set receive deadline.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Set send deadline.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Set survey window.
    pub fn with_survey_time(mut self, window: Duration) -> Self {
        self.survey_time = window;
        self
    }

    /// Set handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set maximum inbound message size.
    pub fn with_max_msg_size(mut self, size: usize) -> Self {
        self.max_msg_size = size;
        self
    }

    /// Set the initial delay between dial attempts.
    pub fn with_reconnect_ivl(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl = ivl;
        self
    }

    /// Set the maximum delay between dial attempts.
    pub fn with_reconnect_ivl_max(mut self, max: Duration) -> Self {
        self.reconnect_ivl_max = max;
        self
    }

    /// Set the number of dial attempts (at least one is always made).
    pub fn with_dial_attempts(mut self, attempts: u32) -> Self {
        self.dial_attempts = attempts.max(1);
        self
    }
}

/// A single option change on a live socket.
///
/// Options that only make sense for one protocol (`SurveyTime`, `Subscribe`,
/// `Unsubscribe`) are rejected by every other socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketOption {
    /// Bound a single `recv()`; `None` blocks indefinitely
    RecvDeadline(Option<Duration>),
    /// Bound how long a send waits for a peer; `None` waits indefinitely
    SendDeadline(Option<Duration>),
    /// SURVEYOR reply window
    SurveyTime(Duration),
    /// SUB: accept messages starting with this prefix (empty = all)
    Subscribe(Bytes),
    /// SUB: drop a previously added prefix
    Unsubscribe(Bytes),
    /// Inbound message limit for pipes attached afterwards
    MaxMsgSize(usize),
    /// Greeting deadline for pipes attached afterwards
    HandshakeTimeout(Duration),
    /// Connection attempts made by subsequent `dial()` calls
    DialAttempts(u32),
}

impl SocketOption {
    /// Stable option name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RecvDeadline(_) => "receiveDeadline",
            Self::SendDeadline(_) => "sendDeadline",
            Self::SurveyTime(_) => "surveyTime",
            Self::Subscribe(_) => "subscribeFilter",
            Self::Unsubscribe(_) => "unsubscribeFilter",
            Self::MaxMsgSize(_) => "maxMsgSize",
            Self::HandshakeTimeout(_) => "handshakeTimeout",
            Self::DialAttempts(_) => "dialAttempts",
        }
    }

    /// Apply a protocol-independent option.
    ///
    /// Returns the option back when it is protocol-specific so the caller can
    /// handle or reject it.
    pub fn apply_to(self, options: &mut SocketOptions) -> Result<(), SocketOption> {
        match self {
            Self::RecvDeadline(d) => options.recv_timeout = d,
            Self::SendDeadline(d) => options.send_timeout = d,
            Self::MaxMsgSize(size) => options.max_msg_size = size,
            Self::HandshakeTimeout(d) => options.handshake_timeout = d,
            Self::DialAttempts(n) => options.dial_attempts = n.max(1),
            other => return Err(other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SocketOptions::default();
        assert_eq!(opts.recv_timeout, None);
        assert_eq!(opts.send_timeout, None);
        assert_eq!(opts.survey_time, Duration::from_secs(1));
        assert_eq!(opts.max_msg_size, DEFAULT_MAX_MSG_SIZE);
        assert_eq!(opts.dial_attempts, 1);
    }

    #[test]
    fn test_builder() {
        let opts = SocketOptions::new()
            .with_recv_timeout(Duration::from_millis(100))
            .with_send_timeout(Duration::ZERO)
            .with_survey_time(Duration::from_millis(500))
            .with_dial_attempts(0);

        assert_eq!(opts.recv_timeout, Some(Duration::from_millis(100)));
        assert_eq!(opts.send_timeout, Some(Duration::ZERO));
        assert_eq!(opts.survey_time, Duration::from_millis(500));
        assert_eq!(opts.dial_attempts, 1);
    }

    #[test]
    fn test_apply_generic_options() {
        let mut opts = SocketOptions::default();
        SocketOption::RecvDeadline(Some(Duration::from_millis(5)))
            .apply_to(&mut opts)
            .unwrap();
        SocketOption::MaxMsgSize(16).apply_to(&mut opts).unwrap();
        assert_eq!(opts.recv_timeout, Some(Duration::from_millis(5)));
        assert_eq!(opts.max_msg_size, 16);

        SocketOption::RecvDeadline(None).apply_to(&mut opts).unwrap();
        assert_eq!(opts.recv_timeout, None);
    }

    #[test]
    fn test_protocol_specific_options_are_returned() {
        let mut opts = SocketOptions::default();
        let rejected = SocketOption::Subscribe(Bytes::from_static(b"a"))
            .apply_to(&mut opts)
            .unwrap_err();
        assert_eq!(rejected.name(), "subscribeFilter");

        let rejected = SocketOption::SurveyTime(Duration::from_millis(1))
            .apply_to(&mut opts)
            .unwrap_err();
        assert_eq!(rejected.name(), "surveyTime");
        assert_eq!(opts.survey_time, Duration::from_secs(1));
    }
}
