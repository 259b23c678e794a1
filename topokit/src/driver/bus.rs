//! Bus: every node listens, waits for the others to come up, dials its
//! peers, announces its name once and then reports whatever it hears.

use super::{arg, attach, Attach, Driver};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use topokit_sp::BusSocket;

/// Run bus node `name`: `args[0]` is its own listen URL, the rest are peers.
pub async fn run(
    name: &str,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let listen = arg(args, 0, Driver::Bus)?;
    let mut sock = BusSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Listen, listen).await?;

    compio::time::sleep(config.bus_settle).await;
    for peer in &args[1..] {
        attach(&mut sock, Attach::Dial, peer).await?;
    }
    compio::time::sleep(config.bus_warmup).await;

    reporter.report(&format!("{name}: SENDING '{name}' ONTO BUS"));
    sock.send(Bytes::copy_from_slice(name.as_bytes())).await?;

    loop {
        let msg = sock.recv().await?;
        reporter.report(&format!(
            "{name}: RECEIVED '{}' FROM BUS",
            String::from_utf8_lossy(&msg)
        ));
    }
}
