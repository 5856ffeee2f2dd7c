//! Output naming for produced videos and their sidecar records.
//!
//! The output path is a pure function of the settings and the date, apart
//! from creating the output folder, which is idempotent.

use crate::config::{Settings, format_date};
use crate::error::{CoreError, CoreResult};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Date format embedded in every output file name.
pub const FILENAME_DATE_FORMAT: &str = "%Y_%m_%d";

/// Replaces characters that are unsafe in file names (space, `:` and `/`) with `_`.
#[must_use]
pub fn sanitize_for_filename(value: &str) -> String {
    value.replace([' ', ':', '/'], "_")
}

/// Qualifier describing the encoding parameters, in a fixed order:
/// filter, codec, crf, preset, bitrate (max) and size.
#[must_use]
pub fn build_metadata_qualifier(settings: &Settings) -> String {
    let video = &settings.video_output;
    let crf = video.crf.to_string();
    let parts: [(&str, &str); 6] = [
        ("filter", video.video_filter.as_str()),
        ("codec", video.codec.as_str()),
        ("crf", crf.as_str()),
        ("preset", video.preset.as_str()),
        ("bitrate", video.max_bitrate.as_str()),
        ("size", video.video_size.as_str()),
    ];

    parts
        .iter()
        .map(|(label, value)| format!("{label}-{}", sanitize_for_filename(value)))
        .collect::<Vec<_>>()
        .join("_")
}

/// File name (without folder) of the video for `date`.
#[must_use]
pub fn build_output_filename(date: NaiveDate, settings: &Settings) -> String {
    let filename = &settings.filename;
    let mut name = format!(
        "{}{}{}",
        filename.prefix,
        date.format(FILENAME_DATE_FORMAT),
        filename.suffix
    );
    if filename.append_metadata {
        name.push('_');
        name.push_str(&build_metadata_qualifier(settings));
    }
    name.push_str(&filename.normalized_extension());
    name
}

/// Folder receiving the video for `date`.
pub fn output_folder(date: NaiveDate, settings: &Settings) -> CoreResult<PathBuf> {
    let relative = format_date(date, &settings.video_output.folder_structure)?;
    Ok(settings.video_output.folder.join(relative))
}

/// Full output path for `date`. Creates the output folder when missing.
pub fn build_output_path(date: NaiveDate, settings: &Settings) -> CoreResult<PathBuf> {
    let folder = output_folder(date, settings)?;
    fs::create_dir_all(&folder).map_err(|e| {
        CoreError::Path(format!(
            "Failed to create output folder '{}': {}",
            folder.display(),
            e
        ))
    })?;
    Ok(folder.join(build_output_filename(date, settings)))
}

/// Location of the JSON sidecar belonging to `output_path`.
#[must_use]
pub fn sidecar_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("json")
}
