//! Concatenation manifest for ffmpeg's concat demuxer.
//!
//! One `file '<path>'` line per image, in selection order. The file is
//! overwritten on every run and left in place afterwards.
//!
//! The demuxer resolves relative entries against the manifest's folder, so
//! entries are written as absolute paths.

use crate::error::CoreResult;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Formats one manifest entry, escaping single quotes the way the concat
/// demuxer expects (`'` becomes `'\''`).
#[must_use]
pub fn manifest_line(image: &Path) -> String {
    let escaped = image.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}

/// Writes the manifest for `images` to `path`, replacing any previous content.
pub fn write_concat_manifest(path: &Path, images: &[PathBuf]) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(fs::File::create(path)?);
    for image in images {
        writeln!(writer, "{}", manifest_line(&std::path::absolute(image)?))?;
    }
    writer.flush()?;

    log::debug!(
        "Wrote {} manifest entries to {}",
        images.len(),
        path.display()
    );
    Ok(())
}
