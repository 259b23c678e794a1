//! Pair: two symmetric nodes, each alternating a bounded receive with
//! sending its own name.

use super::{arg, attach, parse_role, Attach, Driver};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use std::str::FromStr;
use topokit_core::options::SocketOption;
use topokit_sp::PairSocket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Listens
    Node0,
    /// Dials
    Node1,
}

impl Role {
    pub const fn name(self) -> &'static str {
        match self {
            Role::Node0 => "node0",
            Role::Node1 => "node1",
        }
    }
}

impl FromStr for Role {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_role(s, &[("node0", Role::Node0), ("node1", Role::Node1)], Driver::Pair)
    }
}

pub async fn run(
    role: Role,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let url = arg(args, 0, Driver::Pair)?;
    let mut sock = PairSocket::with_options(config.socket_options());
    let how = match role {
        Role::Node0 => Attach::Listen,
        Role::Node1 => Attach::Dial,
    };
    attach(&mut sock, how, url).await?;
    let result = send_recv(&mut sock, role.name(), config, reporter).await;
    sock.close();
    result
}

/// Receive (non-fatal on timeout), pause, send own name; forever.
async fn send_recv(
    sock: &mut PairSocket,
    name: &str,
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    sock.set_option(SocketOption::RecvDeadline(Some(config.recv_deadline)))?;
    loop {
        match sock.recv().await {
            Ok(msg) => reporter.report(&format!(
                "{name}: RECEIVED: \"{}\"",
                String::from_utf8_lossy(&msg)
            )),
            Err(e) if e.is_timeout() => {}
            Err(e) => return Err(e.into()),
        }

        compio::time::sleep(config.interval).await;

        reporter.report(&format!("{name}: SENDING \"{name}\""));
        sock.send(Bytes::copy_from_slice(name.as_bytes())).await?;
    }
}
