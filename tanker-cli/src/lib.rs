//! Command-line interface for the tanker dispatcher.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::io::Write;

mod dispatch;
mod error;
mod logging;

pub use error::CliError;
pub use logging::init_logging;

use dispatch::DispatchArgs;

pub(crate) const ARG_DISPATCH_REQUEST: &str = "request";
pub(crate) const ARG_DISPATCH_CONFIG: &str = "dispatch-config";
pub(crate) const ARG_DISPATCH_MATRIX: &str = "matrix";
pub(crate) const ARG_DISPATCH_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_DISPATCH_OUTPUT: &str = "output";
pub(crate) const ENV_DISPATCH_REQUEST: &str = "TANKER_CMDS_DISPATCH_REQUEST_PATH";

/// Run the tanker CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration, inputs or the
/// dispatch itself fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Dispatch(args) => dispatch::run_dispatch(args),
        Command::Defaults => {
            let mut stdout = std::io::stdout().lock();
            write_default_config(&mut stdout)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tanker",
    about = "Plan a day of multi-trip fuel deliveries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Schedule a day's orders across the fleet.
    Dispatch(DispatchArgs),
    /// Print the default dispatch configuration as JSON.
    Defaults,
}

fn write_default_config(writer: &mut dyn Write) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(&tanker_core::DispatchConfig::default())
        .map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
