//! Dial backoff.
//!
//! `dial()` retries a refused connection up to `dial_attempts` times, sleeping
//! between attempts with an exponentially growing interval.

use crate::options::SocketOptions;
use std::time::Duration;

/// Tracks dial attempts and computes the backoff delay before the next one.
///
/// # Example
///
/// ```rust
/// use topokit_core::reconnect::ReconnectState;
/// use topokit_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let options = SocketOptions::default()
///     .with_reconnect_ivl(Duration::from_millis(100))
///     .with_reconnect_ivl_max(Duration::from_secs(10))
///     .with_dial_attempts(4);
///
/// let mut backoff = ReconnectState::new(&options);
///
/// assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
/// assert_eq!(backoff.next_delay(), Some(Duration::from_millis(200)));
/// assert_eq!(backoff.next_delay(), Some(Duration::from_millis(400)));
///
/// // Four attempts allow three waits
/// assert_eq!(backoff.next_delay(), None);
/// ```
#[derive(Debug, Clone)]
pub struct ReconnectState {
    base_interval: Duration,
    /// Zero means the interval grows without bound
    max_interval: Duration,
    max_attempts: u32,
    /// Failed attempts so far
    attempt: u32,
    current_interval: Duration,
}

impl ReconnectState {
    /// Create a new backoff tracker from socket options.
    pub fn new(options: &SocketOptions) -> Self {
        Self {
            base_interval: options.reconnect_ivl,
            max_interval: options.reconnect_ivl_max,
            max_attempts: options.dial_attempts.max(1),
            attempt: 0,
            current_interval: options.reconnect_ivl,
        }
    }

    /// Record a failed attempt and return how long to wait before retrying.
    ///
    /// Returns `None` once every allowed attempt has been used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let delay = self.current_interval;
        self.current_interval = self.base_interval * (1_u32 << self.attempt.min(10));
        if !self.max_interval.is_zero() && self.current_interval > self.max_interval {
            self.current_interval = self.max_interval;
        }

        Some(delay)
    }

    /// Failed attempts recorded so far.
    #[inline]
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Total attempts allowed.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
