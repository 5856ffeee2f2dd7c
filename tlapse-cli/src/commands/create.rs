// ============================================================================
// tlapse-cli/src/commands/create.rs
// ============================================================================
//
// CREATE COMMAND: Load settings, set up logging and run one timelapse
//
// Setup failures (unreadable or invalid settings, log folder problems) are
// returned as errors. Once logging is up, the run itself reports through the
// log and its outcome is mapped to an exit status.

use crate::cli::Cli;
use crate::logging::init_logging;

use anyhow::{Context, Result};
use log::debug;
use tlapse_core::{ProcessSpawner, RunOptions, RunOutcome, RunRequest, Settings, run_timelapse};

/// Exit status for a completed run, and for a run with no images to encode.
pub const EXIT_OK: u8 = 0;

/// Exit status for a failed run or a setup error.
pub const EXIT_FAILURE: u8 = 1;

/// Maps the outcome of a run to the process exit status.
pub fn exit_status(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::Completed(_) | RunOutcome::Aborted(_) => EXIT_OK,
        RunOutcome::Failed(_) => EXIT_FAILURE,
    }
}

/// Runs the create command and returns the exit status.
pub fn run_create(args: &Cli) -> Result<u8> {
    let settings = Settings::from_file(&args.config).with_context(|| {
        format!("Failed to load settings from '{}'", args.config.display())
    })?;

    let log_path = init_logging(&settings.log)?;
    debug!("Logging to {}", log_path.display());
    debug!("Settings loaded from {}", args.config.display());

    let request = RunRequest::new(args.date_or_today()).with_test_limit(args.test_amount);
    let options = RunOptions {
        show_progress: !args.no_progress,
    };

    let outcome = run_timelapse(&ProcessSpawner, &settings, &request, &options);
    Ok(exit_status(&outcome))
}
