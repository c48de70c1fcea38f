//! Logging setup. Diagnostics go to stderr so JSON output on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
