//! PubSub: the publisher broadcasts the date every interval; subscribers
//! report everything they receive. Late subscribers miss earlier dates.

use super::{arg, attach, date, parse_role, Attach, Driver};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use std::str::FromStr;
use topokit_core::options::SocketOption;
use topokit_sp::{PubSocket, SubSocket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Publisher,
    Subscriber,
}

impl FromStr for Role {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_role(
            s,
            &[
                ("publisher", Role::Publisher),
                ("server", Role::Publisher),
                ("subscriber", Role::Subscriber),
                ("client", Role::Subscriber),
            ],
            Driver::PubSub,
        )
    }
}

pub async fn run(
    role: Role,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let url = arg(args, 0, Driver::PubSub)?;
    match role {
        Role::Publisher => publish(url, config, reporter).await,
        Role::Subscriber => {
            let name = arg(args, 1, Driver::PubSub)?;
            subscribe(url, name, config, reporter).await
        }
    }
}

async fn publish(url: &str, config: &DriverConfig, reporter: &dyn Reporter) -> Result<(), DriverError> {
    let mut sock = PubSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Listen, url).await?;

    loop {
        let d = date();
        reporter.report(&format!("SERVER: PUBLISHING DATE {d}"));
        sock.send(Bytes::from(d)).await?;
        compio::time::sleep(config.interval).await;
    }
}

async fn subscribe(
    url: &str,
    name: &str,
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let mut sock = SubSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Dial, url).await?;
    sock.set_option(SocketOption::Subscribe(Bytes::new()))?;

    loop {
        let msg = sock.recv().await?;
        reporter.report(&format!(
            "CLIENT ({name}): RECEIVED {}",
            String::from_utf8_lossy(&msg)
        ));
    }
}
