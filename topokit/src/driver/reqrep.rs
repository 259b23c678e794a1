//! ReqRep: the responder answers [`DATE_QUERY`](super::DATE_QUERY) with the
//! current date and ignores anything else; the requester performs a single
//! exchange.

use super::{arg, attach, date, parse_role, Attach, Driver, DATE_QUERY};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use std::str::FromStr;
use topokit_sp::{RepSocket, ReqSocket};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Responder,
    Requester,
}

impl FromStr for Role {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_role(
            s,
            &[
                ("responder", Role::Responder),
                ("node0", Role::Responder),
                ("requester", Role::Requester),
                ("node1", Role::Requester),
            ],
            Driver::ReqRep,
        )
    }
}

pub async fn run(
    role: Role,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let url = arg(args, 0, Driver::ReqRep)?;
    match role {
        Role::Responder => respond(url, config, reporter).await,
        Role::Requester => {
            let mut sock = ReqSocket::with_options(config.socket_options());
            attach(&mut sock, Attach::Dial, url).await?;

            reporter.report(&format!("NODE1: SENDING DATE REQUEST {DATE_QUERY}"));
            let reply = request(&mut sock, Bytes::from_static(DATE_QUERY.as_bytes())).await;
            sock.close();

            let reply = reply?;
            reporter.report(&format!("NODE1: RECEIVED DATE {}", String::from_utf8_lossy(&reply)));
            Ok(())
        }
    }
}

/// One exchange: send `query`, wait for its correlated reply.
pub async fn request(sock: &mut ReqSocket, query: Bytes) -> Result<Bytes, DriverError> {
    sock.send(query).await?;
    Ok(sock.recv().await?)
}

async fn respond(url: &str, config: &DriverConfig, reporter: &dyn Reporter) -> Result<(), DriverError> {
    let mut sock = RepSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Listen, url).await?;

    loop {
        let msg = sock.recv().await?;
        if msg != DATE_QUERY {
            trace!("Ignoring request {:?}", msg);
            continue;
        }
        reporter.report("NODE0: RECEIVED DATE REQUEST");
        let d = date();
        reporter.report(&format!("NODE0: SENDING DATE {d}"));
        sock.send(Bytes::from(d)).await?;
    }
}
