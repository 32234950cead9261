//! Logging setup for solo binaries
//!
//! Command output goes to stdout; diagnostics go to stderr so piping the
//! result of `get`/`call` stays clean. `RUST_LOG` wins over the flag.

use tracing_subscriber::EnvFilter;

pub fn init(dev: bool) {
    let default_level = if dev { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a host process may have installed a subscriber already.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
