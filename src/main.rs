use clap::Parser;
use desksave::logging::setup_logging;
use desksave::output::OutputFormatter;
use desksave::{Cli, run_cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
