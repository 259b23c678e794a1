//! # Topokit
//!
//! Six messaging topologies built on scalability-protocol sockets:
//!
//! | topology | sockets | contract |
//! |----------|---------|----------|
//! | pair | PAIR ↔ PAIR | two peers, alternate receive/send |
//! | pipeline | PUSH → PULL | one message per pusher, `"STOP"` ends the puller |
//! | pubsub | PUB → SUB | periodic broadcast, no replay for late joiners |
//! | reqrep | REQ ↔ REP | one correlated exchange |
//! | survey | SURVEYOR ↔ RESPONDENT | scatter/gather bounded by time only |
//! | bus | BUS ↔ BUS | every node hears its direct peers |
//!
//! ## Architecture
//!
//! - **`topokit-core`**: endpoints, errors, options, wire framing, inproc registry
//! - **`topokit-sp`**: the protocol sockets and the [`Socket`](sp::Socket) trait
//! - **`topokit`**: the topology drivers and the `topokit` binary (this crate)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use topokit::{Driver, DriverConfig, StdoutReporter};
//!
//! # async fn example() -> Result<(), topokit::DriverError> {
//! let args = vec!["tcp://127.0.0.1:40899".to_string()];
//! Driver::Survey
//!     .run("server", &args, &DriverConfig::default(), &StdoutReporter)
//!     .await
//! # }
//! ```

pub mod config;
pub mod dev_tracing;
pub mod driver;
pub mod error;
pub mod report;

pub use config::DriverConfig;
pub use driver::Driver;
pub use error::DriverError;
pub use report::{MemoryReporter, Reporter, StdoutReporter};

/// Re-export of the socket layer.
pub use topokit_sp as sp;

pub mod prelude {
    pub use crate::{Driver, DriverConfig, DriverError, MemoryReporter, Reporter, StdoutReporter};
    pub use topokit_sp::prelude::*;
}
