//! Core library for turning a day of camera stills into a timelapse video.
//!
//! Images are picked from a dated folder hierarchy, listed in an ffmpeg concat
//! manifest and encoded by an external ffmpeg process whose progress stream
//! drives a progress bar. A JSON sidecar describing the result can be written
//! next to the video.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tlapse_core::{ProcessSpawner, RunOptions, RunOutcome, RunRequest, Settings, run_timelapse};
//! use chrono::NaiveDate;
//!
//! let settings = Settings::from_file("config.yaml").unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//!
//! match run_timelapse(&ProcessSpawner, &settings, &RunRequest::new(date), &RunOptions::default()) {
//!     RunOutcome::Completed(result) => println!("wrote {}", result.output_path.display()),
//!     RunOutcome::Aborted(reason) => println!("nothing to do: {reason:?}"),
//!     RunOutcome::Failed(e) => eprintln!("failed: {e}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod logging;
pub mod manifest;
pub mod metadata;
pub mod naming;
pub mod processing;
pub mod progress;
pub mod selection;
pub mod utils;

// Re-exports for public API
pub use config::Settings;
pub use error::{CoreError, CoreResult};
pub use external::{
    EncoderExit, EncoderInvocation, EncoderProcess, EncoderSpawner, ProcessSpawner,
    build_encoder_invocation,
};
pub use metadata::{RunResult, SidecarRecord, TestAmount};
pub use naming::{build_metadata_qualifier, build_output_path, sanitize_for_filename};
pub use processing::{
    AbortReason, RunCompletion, RunOptions, RunOutcome, RunRequest, RunState, create_timelapse,
    run_timelapse,
};
pub use progress::ProgressMonitor;
pub use selection::select_images;
pub use utils::{format_elapsed, format_mib};
