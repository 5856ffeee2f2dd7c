// tlapse-cli/src/main.rs
//
// Entry point of the `tlapse` binary: parses arguments, runs the create
// command and turns its result into the process exit code.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tlapse_cli::commands::create::EXIT_FAILURE;
use tlapse_cli::{Cli, run_create};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_create(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
