//! Driver configuration.

use std::time::Duration;
use topokit_core::options::SocketOptions;

/// Tunables shared by the topology drivers.
///
/// Defaults reproduce the classic demo timings.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Pair: bound on each receive before sending (default 100ms)
    pub recv_deadline: Duration,
    /// Survey: reply window per round (default 500ms)
    pub survey_time: Duration,
    /// Pair pause between cycles and PubSub publish period (default 1s)
    pub interval: Duration,
    /// Pipeline: how long the pusher keeps its socket open after sending (default 100ms)
    pub linger: Duration,
    /// Bus: pause between listening and dialing peers (default 3s)
    pub bus_settle: Duration,
    /// Bus: pause between dialing and sending (default 1s)
    pub bus_warmup: Duration,
    /// Connection attempts per dial (default 1)
    pub dial_attempts: u32,
    /// Bound on how long a send waits for a peer (default: wait indefinitely)
    pub send_deadline: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            recv_deadline: Duration::from_millis(100),
            survey_time: Duration::from_millis(500),
            interval: Duration::from_secs(1),
            linger: Duration::from_millis(100),
            bus_settle: Duration::from_secs(3),
            bus_warmup: Duration::from_secs(1),
            dial_attempts: 1,
            send_deadline: None,
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recv_deadline(mut self, deadline: Duration) -> Self {
        self.recv_deadline = deadline;
        self
    }

    pub fn with_survey_time(mut self, window: Duration) -> Self {
        self.survey_time = window;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    /// Set both bus pauses at once.
    pub fn with_bus_delays(mut self, settle: Duration, warmup: Duration) -> Self {
        self.bus_settle = settle;
        self.bus_warmup = warmup;
        self
    }

    pub fn with_dial_attempts(mut self, attempts: u32) -> Self {
        self.dial_attempts = attempts.max(1);
        self
    }

    pub fn with_send_deadline(mut self, deadline: Duration) -> Self {
        self.send_deadline = Some(deadline);
        self
    }

    /// Socket options every driver starts from.
    pub fn socket_options(&self) -> SocketOptions {
        let mut options = SocketOptions::default().with_dial_attempts(self.dial_attempts);
        options.send_timeout = self.send_deadline;
        options
    }
}
