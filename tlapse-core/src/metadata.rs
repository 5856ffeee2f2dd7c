// ============================================================================
// tlapse-core/src/metadata.rs
// ============================================================================
//
// RUN METADATA: What a completed run produced, and its JSON sidecar
//
// `RunResult` is assembled once encoding has finished and is never modified
// afterwards. When `metadata.save_to_file` is enabled it is flattened into a
// `SidecarRecord` and written next to the video with the same stem and a
// `.json` extension.

use crate::config::Settings;
use crate::error::CoreResult;
use crate::utils::{format_elapsed, format_mib};
use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use serde::{Serialize, Serializer};
use std::fs;
use std::io::{BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Timestamp format used for `start_time` and `end_time` in the sidecar.
pub const SIDECAR_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Encoding parameters a video was produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingParameters {
    pub video_filter: String,
    pub codec: String,
    pub crf: u8,
    pub preset: String,
    pub bitrate: String,
    pub video_size: String,
}

impl EncodingParameters {
    pub fn from_settings(settings: &Settings) -> Self {
        let video = &settings.video_output;
        Self {
            video_filter: video.video_filter.clone(),
            codec: video.codec.clone(),
            crf: video.crf,
            preset: video.preset.clone(),
            bitrate: video.max_bitrate.clone(),
            video_size: video.video_size.clone(),
        }
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub date: NaiveDate,
    pub output_path: PathBuf,
    pub output_size: u64,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub image_count: usize,
    pub image_input_folder: PathBuf,
    pub encoding: EncodingParameters,
    pub test_limit: Option<NonZeroUsize>,
}

impl RunResult {
    /// Wall-clock time between the start of the run and the end of encoding.
    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    pub fn sidecar_record(&self) -> SidecarRecord {
        SidecarRecord {
            date: self.date.format("%Y-%m-%d").to_string(),
            output_file: self.output_path.display().to_string(),
            file_size_mb: format_mib(self.output_size),
            duration: format_elapsed(self.duration()),
            start_time: self.start_time.format(SIDECAR_TIMESTAMP_FORMAT).to_string(),
            end_time: self.end_time.format(SIDECAR_TIMESTAMP_FORMAT).to_string(),
            number_of_images: self.image_count,
            image_input_folder: self.image_input_folder.display().to_string(),
            video_filter: self.encoding.video_filter.clone(),
            codec: self.encoding.codec.clone(),
            crf: self.encoding.crf,
            preset: self.encoding.preset.clone(),
            bitrate: self.encoding.bitrate.clone(),
            video_size: self.encoding.video_size.clone(),
            test_amount: TestAmount::from(self.test_limit),
        }
    }
}

/// Either the image limit used for a test run, or `"full"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestAmount {
    Limited(usize),
    Full,
}

impl From<Option<NonZeroUsize>> for TestAmount {
    fn from(limit: Option<NonZeroUsize>) -> Self {
        limit.map_or(TestAmount::Full, |n| TestAmount::Limited(n.get()))
    }
}

impl Serialize for TestAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TestAmount::Limited(n) => serializer.serialize_u64(*n as u64),
            TestAmount::Full => serializer.serialize_str("full"),
        }
    }
}

/// Flat JSON record written next to the video. Field order is the output order.
#[derive(Debug, Clone, Serialize)]
pub struct SidecarRecord {
    pub date: String,
    pub output_file: String,
    #[serde(rename = "file_size_MB")]
    pub file_size_mb: String,
    pub duration: String,
    pub start_time: String,
    pub end_time: String,
    pub number_of_images: usize,
    pub image_input_folder: String,
    pub video_filter: String,
    pub codec: String,
    pub crf: u8,
    pub preset: String,
    pub bitrate: String,
    pub video_size: String,
    pub test_amount: TestAmount,
}

/// Writes `record` to `path` as JSON indented with four spaces.
pub fn write_sidecar(path: &Path, record: &SidecarRecord) -> CoreResult<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    record.serialize(&mut serializer)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
