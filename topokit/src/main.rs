//! `topokit` node runner.
//!
//! Runs one role of one topology per process:
//!
//! ```text
//! topokit pair node0 tcp://127.0.0.1:40899
//! topokit pair node1 tcp://127.0.0.1:40899
//! topokit survey surveyor tcp://127.0.0.1:40899
//! topokit survey respondent tcp://127.0.0.1:40899 client0
//! topokit bus node0 tcp://127.0.0.1:40890 tcp://127.0.0.1:40891
//! ```
//!
//! Progress lines go to stdout, logs to stderr (`RUST_LOG` controls them).

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use topokit::dev_tracing::init_cli_tracing;
use topokit::{Driver, DriverConfig, StdoutReporter};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// pair, pipeline, pubsub, reqrep, survey or bus
    topology: String,

    /// Role within the topology (for bus: the node name)
    role: String,

    /// URLs and names for the role
    args: Vec<String>,

    /// Pair receive deadline
    #[arg(long, default_value_t = 100)]
    recv_deadline_ms: u64,

    /// Survey reply window
    #[arg(long, default_value_t = 500)]
    survey_time_ms: u64,

    /// Pair cycle pause and publish period
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Connection attempts per dial, 100ms apart with doubling backoff
    #[arg(long, default_value_t = 1)]
    dial_attempts: u32,
}

impl Cli {
    fn config(&self) -> DriverConfig {
        DriverConfig::default()
            .with_recv_deadline(Duration::from_millis(self.recv_deadline_ms))
            .with_survey_time(Duration::from_millis(self.survey_time_ms))
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_dial_attempts(self.dial_attempts)
    }
}

#[compio::main]
async fn main() -> ExitCode {
    init_cli_tracing();
    let cli = Cli::parse();

    let driver: Driver = match cli.topology.parse() {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = cli.config();
    match driver.run(&cli.role, &cli.args, &config, &StdoutReporter).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{driver} {}: {e}", cli.role);
            ExitCode::FAILURE
        }
    }
}
