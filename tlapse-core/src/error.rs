// ============================================================================
// tlapse-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the tlapse-core library
//
// Every fallible operation in the library returns `CoreResult<T>`. Errors are
// propagated with `?` up to the run orchestrator, which is the only place they
// are turned into a logged outcome.
//
// KEY COMPONENTS:
// - CoreError: the error taxonomy (configuration, selection, encoder, I/O).
//   Unparsable settings documents are configuration errors.
// - CoreResult: result alias used across the crate
// - Helper constructors for encoder launch/runtime failures

use chrono::NaiveDate;
use std::io;
use thiserror::Error;

/// Custom error types for tlapse-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No images found for the selected date: {0}")]
    NoImagesFound(NaiveDate),

    #[error("Date out of range: {0} has no following day")]
    DateOutOfRange(NaiveDate),

    #[error("Failed to start encoder '{program}': {source}")]
    EncoderLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Encoder exited with {}{}", describe_exit(.code), describe_stderr(.stderr))]
    EncoderRuntime { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path error: {0}")]
    Path(String),
}

/// Result type for tlapse-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.trim())
    }
}

/// Builds an `EncoderLaunch` error for a program that failed to spawn.
pub fn encoder_launch_error(program: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::EncoderLaunch {
        program: program.into(),
        source,
    }
}

/// Builds an `EncoderRuntime` error from an exit code and collected stderr lines.
pub fn encoder_runtime_error(code: Option<i32>, stderr_lines: &[String]) -> CoreError {
    CoreError::EncoderRuntime {
        code,
        stderr: stderr_lines.join("\n"),
    }
}
