// ============================================================================
// tlapse-core/src/processing.rs
// ============================================================================
//
// RUN ORCHESTRATION: One date in, one video (and optional sidecar) out
//
// WORKFLOW:
// 1. Select the images for the requested date (Selecting)
// 2. Write the concatenation manifest (ManifestWritten)
// 3. Resolve the output path, build the encoder invocation, spawn the encoder
//    and follow its progress stream until it closes (Encoding)
// 4. Check the exit status, measure the output and log a summary; write the
//    sidecar when enabled (Completed)
//
// An empty selection stops the run before anything is written (Aborted).
// Any error along the way ends the run (Failed). `run_timelapse` is the only
// place errors are turned into a logged outcome; nothing is retried.

use crate::config::Settings;
use crate::error::{CoreError, CoreResult, encoder_runtime_error};
use crate::external::{EncoderProcess, EncoderSpawner, build_encoder_invocation};
use crate::logging::{LogColor, log_with_color};
use crate::manifest::write_concat_manifest;
use crate::metadata::{EncodingParameters, RunResult, write_sidecar};
use crate::naming::{build_output_path, sidecar_path};
use crate::progress::ProgressMonitor;
use crate::selection::select_images;
use crate::utils::{format_elapsed, format_mib};

use chrono::{Local, NaiveDate};
use log::{Level, debug};
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;

/// What to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub date: NaiveDate,
    /// Use only the first N selected images
    pub test_limit: Option<NonZeroUsize>,
}

impl RunRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            test_limit: None,
        }
    }

    #[must_use]
    pub fn with_test_limit(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.test_limit = limit;
        self
    }
}

/// Presentation switches that do not affect the produced files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

/// Steps of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Selecting,
    ManifestWritten,
    Encoding,
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Selecting => "selecting",
            RunState::ManifestWritten => "manifest written",
            RunState::Encoding => "encoding",
            RunState::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoImages(NaiveDate),
}

/// Terminal state of `run_timelapse`.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunResult),
    Aborted(AbortReason),
    Failed(CoreError),
}

impl RunOutcome {
    /// True only for `Failed`; an aborted run is reported but is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// Successful end of `create_timelapse`.
#[derive(Debug)]
pub enum RunCompletion {
    Completed(RunResult),
    NoImages,
}

fn enter(state: RunState) {
    debug!("Run state: {state}");
}

/// Runs the whole pipeline for one date, propagating the first error.
pub fn create_timelapse<S: EncoderSpawner>(
    spawner: &S,
    settings: &Settings,
    request: &RunRequest,
    options: &RunOptions,
) -> CoreResult<RunCompletion> {
    let start_time = Local::now();
    let date = request.date;
    log_with_color(
        Level::Info,
        LogColor::Green,
        &format!("Creating timelapse for date: {date}"),
    );

    enter(RunState::Selecting);
    if settings.image_input.morning_to_morning {
        log_with_color(
            Level::Info,
            LogColor::Cyan,
            "Applying morning-to-morning logic",
        );
    }
    let images = select_images(date, settings, request.test_limit)?;
    if images.is_empty() {
        return Ok(RunCompletion::NoImages);
    }
    if let Some(limit) = request.test_limit {
        log_with_color(
            Level::Info,
            LogColor::Magenta,
            &format!("Using only the first {limit} images for testing"),
        );
    }

    let manifest = &settings.encoder.manifest;
    write_concat_manifest(manifest, &images)?;
    enter(RunState::ManifestWritten);

    let output_path = build_output_path(date, settings)?;
    let invocation =
        build_encoder_invocation(manifest, &output_path, settings).with_progress_reporting();
    log_with_color(
        Level::Info,
        LogColor::Cyan,
        &format!("Running encoder command: {invocation}"),
    );

    enter(RunState::Encoding);
    let mut process = spawner.spawn(&invocation)?;
    let monitor = ProgressMonitor::new(images.len() as u64, options.show_progress);
    if let Some(stream) = process.take_progress_stream() {
        let last_frame = monitor.monitor(stream);
        debug!("Progress stream closed at frame {last_frame}");
    }
    let exit = process.wait()?;
    if !exit.success {
        return Err(encoder_runtime_error(exit.code, &exit.stderr_tail));
    }

    let end_time = Local::now();
    let output_size = fs::metadata(&output_path)?.len();
    let result = RunResult {
        date,
        output_path,
        output_size,
        start_time,
        end_time,
        image_count: images.len(),
        image_input_folder: settings.image_input.folder.clone(),
        encoding: EncodingParameters::from_settings(settings),
        test_limit: request.test_limit,
    };
    enter(RunState::Completed);

    log_with_color(
        Level::Info,
        LogColor::Green,
        &format!("Timelapse created successfully: {}", result.output_path.display()),
    );
    log_with_color(
        Level::Info,
        LogColor::Blue,
        &format!("Timelapse duration: {}", format_elapsed(result.duration())),
    );
    log_with_color(
        Level::Info,
        LogColor::Blue,
        &format!("Output file size: {} MB", format_mib(result.output_size)),
    );

    if settings.metadata.save_to_file {
        let sidecar = sidecar_path(&result.output_path);
        write_sidecar(&sidecar, &result.sidecar_record())?;
        log_with_color(
            Level::Info,
            LogColor::Green,
            &format!("Metadata saved to {}", sidecar.display()),
        );
    }

    Ok(RunCompletion::Completed(result))
}

/// Runs the pipeline and reports how it ended. Never panics on run errors
/// and never retries.
pub fn run_timelapse<S: EncoderSpawner>(
    spawner: &S,
    settings: &Settings,
    request: &RunRequest,
    options: &RunOptions,
) -> RunOutcome {
    match create_timelapse(spawner, settings, request, options) {
        Ok(RunCompletion::Completed(result)) => RunOutcome::Completed(result),
        Ok(RunCompletion::NoImages) => {
            let reason = CoreError::NoImagesFound(request.date);
            log_with_color(Level::Error, LogColor::Red, &reason.to_string());
            RunOutcome::Aborted(AbortReason::NoImages(request.date))
        }
        Err(e) => {
            log_with_color(
                Level::Error,
                LogColor::Red,
                &format!("Error creating timelapse: {e}"),
            );
            RunOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_display() {
        assert_eq!(RunState::ManifestWritten.to_string(), "manifest written");
        assert_eq!(RunState::Completed.to_string(), "completed");
    }

    #[test]
    fn test_only_failed_is_failure() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(!RunOutcome::Aborted(AbortReason::NoImages(date)).is_failure());
        assert!(RunOutcome::Failed(CoreError::Config("bad".to_string())).is_failure());
    }

    #[test]
    fn test_request_builder() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let request = RunRequest::new(date).with_test_limit(NonZeroUsize::new(3));
        assert_eq!(request.test_limit.map(NonZeroUsize::get), Some(3));
    }
}
