//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tanker_cli::CliError;

fn main() {
    tanker_cli::init_logging();
    match tanker_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("tanker: {err}");
            std::process::exit(1);
        }
    }
}
