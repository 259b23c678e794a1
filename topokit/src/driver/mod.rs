//! Topology drivers.
//!
//! Each driver opens the sockets for one role, runs that role's loop, and
//! closes its sockets on every exit path. Fatal socket errors end the driver
//! with `DriverError::Socket`; `Timeout` is handled inside the drivers that
//! use it as a signal.

pub mod bus;
pub mod pair;
pub mod pipeline;
pub mod pubsub;
pub mod reqrep;
pub mod survey;

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use std::fmt;
use std::str::FromStr;
use topokit_sp::Socket;
use tracing::debug;

/// Query token answered by REP responders and sent by surveyors.
pub const DATE_QUERY: &str = "DATE";

/// One of the six topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Pair,
    Pipeline,
    PubSub,
    ReqRep,
    Survey,
    Bus,
}

impl Driver {
    pub const ALL: [Driver; 6] = [
        Driver::Pair,
        Driver::Pipeline,
        Driver::PubSub,
        Driver::ReqRep,
        Driver::Survey,
        Driver::Bus,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Driver::Pair => "pair",
            Driver::Pipeline => "pipeline",
            Driver::PubSub => "pubsub",
            Driver::ReqRep => "reqrep",
            Driver::Survey => "survey",
            Driver::Bus => "bus",
        }
    }

    /// Role and argument synopsis.
    pub const fn usage(self) -> &'static str {
        match self {
            Driver::Pair => "pair node0|node1 <URL>",
            Driver::Pipeline => "pipeline puller <URL> | pipeline pusher <URL> <MSG>",
            Driver::PubSub => "pubsub publisher <URL> | pubsub subscriber <URL> <NAME>",
            Driver::ReqRep => "reqrep responder|requester <URL>",
            Driver::Survey => "survey surveyor <URL> | survey respondent <URL> <NAME>",
            Driver::Bus => "bus <NODE_NAME> <LISTEN_URL> [PEER_URL]...",
        }
    }

    /// Run `role` with positional `args` until the role finishes or fails.
    ///
    /// Roles that loop forever (pair nodes, publisher, subscriber, responder,
    /// surveyor, respondent, bus nodes) only return on error; stop them by
    /// dropping the future.
    pub async fn run(
        &self,
        role: &str,
        args: &[String],
        config: &DriverConfig,
        reporter: &dyn Reporter,
    ) -> Result<(), DriverError> {
        debug!(topology = self.name(), role, ?args, "Starting driver");
        match self {
            Driver::Pair => pair::run(role.parse()?, args, config, reporter).await,
            Driver::Pipeline => pipeline::run(role.parse()?, args, config, reporter).await,
            Driver::PubSub => pubsub::run(role.parse()?, args, config, reporter).await,
            Driver::ReqRep => reqrep::run(role.parse()?, args, config, reporter).await,
            Driver::Survey => survey::run(role.parse()?, args, config, reporter).await,
            Driver::Bus => bus::run(role, args, config, reporter).await,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Driver {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Driver::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DriverError::usage(format!(
                    "unknown topology '{s}' (expected pair, pipeline, pubsub, reqrep, survey or bus)"
                ))
            })
    }
}

/// Look a role token up in `(token, role)` pairs, case-insensitively.
pub(crate) fn parse_role<R: Copy>(
    token: &str,
    table: &[(&str, R)],
    driver: Driver,
) -> Result<R, DriverError> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, role)| *role)
        .ok_or_else(|| DriverError::usage(format!("unknown role '{token}': {}", driver.usage())))
}

/// Positional argument `idx`, or a usage error.
pub(crate) fn arg(args: &[String], idx: usize, driver: Driver) -> Result<&str, DriverError> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| DriverError::usage(driver.usage()))
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Attach {
    Listen,
    Dial,
}

/// Listen on or dial `url` with any socket.
pub(crate) async fn attach<S>(socket: &mut S, how: Attach, url: &str) -> Result<(), DriverError>
where
    S: Socket + ?Sized,
{
    match how {
        Attach::Listen => {
            let bound = socket.listen(url).await?;
            debug!(protocol = %socket.protocol(), %bound, "Listening");
        }
        Attach::Dial => {
            socket.dial(url).await?;
            debug!(protocol = %socket.protocol(), url, "Dialed");
        }
    }
    Ok(())
}

/// Current local time, `asctime` style (`Mon Jan  2 15:04:05 2006`).
pub fn date() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
