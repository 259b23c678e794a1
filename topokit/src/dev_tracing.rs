/// Development helper: initialize tracing subscriber when `RUST_LOG` is set.
///
/// Tests can call `topokit::dev_tracing::init_tracing()` to see socket
/// internals. No-op when `RUST_LOG` is unset or a global subscriber is
/// already installed.
pub fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Install the subscriber used by the `topokit` binary.
///
/// Logs go to stderr so they never mix with progress lines on stdout.
/// `RUST_LOG` overrides the default level of `warn`.
pub fn init_cli_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
