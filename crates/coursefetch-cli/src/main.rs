use coursefetch_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; fall back to stderr when the
    // state directory is unavailable.
    if logging::init_logging().is_err() {
        let _ = logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("coursefetch error: {err:#}");
        std::process::exit(1);
    }
}
