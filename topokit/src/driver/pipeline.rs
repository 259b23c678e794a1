//! Pipeline: a pusher sends one message and leaves; the puller reports every
//! message until it receives [`STOP_SENTINEL`].

use super::{arg, attach, parse_role, Attach, Driver};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use std::str::FromStr;
use topokit_sp::{PullSocket, PushSocket};
use tracing::debug;

/// In-band termination token for the puller.
pub const STOP_SENTINEL: &str = "STOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Puller,
    Pusher,
}

impl FromStr for Role {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_role(
            s,
            &[
                ("puller", Role::Puller),
                ("node0", Role::Puller),
                ("pusher", Role::Pusher),
                ("node1", Role::Pusher),
            ],
            Driver::Pipeline,
        )
    }
}

pub async fn run(
    role: Role,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let url = arg(args, 0, Driver::Pipeline)?;
    match role {
        Role::Puller => pull(url, config, reporter).await,
        Role::Pusher => {
            let msg = arg(args, 1, Driver::Pipeline)?;
            push(url, msg, config, reporter).await
        }
    }
}

/// Listen and report messages until the stop sentinel arrives.
pub async fn pull(url: &str, config: &DriverConfig, reporter: &dyn Reporter) -> Result<(), DriverError> {
    let mut sock = PullSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Listen, url).await?;

    loop {
        let msg = sock.recv().await?;
        reporter.report(&format!("NODE0: RECEIVED \"{}\"", String::from_utf8_lossy(&msg)));
        if msg == STOP_SENTINEL {
            reporter.report("NODE0: STOPPING");
            break;
        }
    }
    sock.close();
    Ok(())
}

/// Dial, send one message, linger so it leaves the queue, close.
pub async fn push(
    url: &str,
    msg: &str,
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let mut sock = PushSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Dial, url).await?;

    reporter.report(&format!("NODE1: SENDING \"{msg}\""));
    sock.send(Bytes::copy_from_slice(msg.as_bytes())).await?;

    compio::time::sleep(config.linger).await;
    debug!("Pusher done");
    sock.close();
    Ok(())
}
