//! Diagnostic output for the binary.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install a stderr formatter filtered by `RUST_LOG` (default `warn`).
///
/// `log` records from the library crates are forwarded to the same
/// formatter. Calling this twice keeps the first subscriber.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(err) = installed {
        log::debug!("logging already initialised: {err}");
    }
}
