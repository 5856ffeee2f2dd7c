// ============================================================================
// tlapse-core/src/selection.rs
// ============================================================================
//
// IMAGE SELECTION: Resolve the images that make up one day's timelapse
//
// Images are stored in dated folders (`image_input.folder` + the date rendered
// with `image_input.folder_structure`). File names embed zero-padded capture
// timestamps, so ascending name order is chronological order.
//
// In morning-to-morning mode the day runs from `morning_time` on the selected
// date to `morning_time` on the following date. The window is applied to file
// modification times, not to the timestamp in the file name: an image that is
// touched or moved after capture lands in the wrong window.

use crate::config::{Settings, format_date};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};
use log::debug;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Morning-to-morning window in local time, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SelectionWindow {
    /// Window from `morning_time` on `date` to `morning_time` one day later.
    pub fn morning_to_morning(date: NaiveDate, settings: &Settings) -> CoreResult<Self> {
        let start = date.and_time(settings.image_input.morning_time);
        let end = start
            .checked_add_days(Days::new(1))
            .ok_or(CoreError::DateOutOfRange(date))?;
        Ok(Self { start, end })
    }
}

/// Returns the folder holding the images captured on `date`.
pub fn image_folder(date: NaiveDate, settings: &Settings) -> CoreResult<PathBuf> {
    let relative = format_date(date, &settings.image_input.folder_structure)?;
    Ok(settings.image_input.folder.join(relative))
}

/// Lists image files for `date`, sorted ascending.
///
/// A folder that does not exist simply has no images.
pub fn list_images(date: NaiveDate, settings: &Settings) -> CoreResult<Vec<PathBuf>> {
    let folder = image_folder(date, settings)?;
    let entries = match fs::read_dir(&folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Image folder {} does not exist", folder.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let extension = &settings.image_input.extension;
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(extension.as_str()) {
            images.push(entry.path());
        }
    }
    images.sort();

    debug!("Found {} image(s) in {}", images.len(), folder.display());
    Ok(images)
}

/// Selects the ordered image set for `date`.
///
/// Returns an empty vector when nothing matches; deciding whether that is
/// fatal is left to the caller.
pub fn select_images(
    date: NaiveDate,
    settings: &Settings,
    test_limit: Option<NonZeroUsize>,
) -> CoreResult<Vec<PathBuf>> {
    let mut images = if settings.image_input.morning_to_morning {
        let window = SelectionWindow::morning_to_morning(date, settings)?;
        debug!(
            "Selecting images modified between {} and {}",
            window.start, window.end
        );
        let next_day = date.succ_opt().ok_or(CoreError::DateOutOfRange(date))?;

        let mut today = list_images(date, settings)?;
        retain_modified(&mut today, |modified| modified >= window.start)?;

        let mut tomorrow = list_images(next_day, settings)?;
        retain_modified(&mut tomorrow, |modified| modified <= window.end)?;

        today.extend(tomorrow);
        today
    } else {
        list_images(date, settings)?
    };

    if let Some(limit) = test_limit {
        images.truncate(limit.get());
    }
    Ok(images)
}

/// Local, naive modification time of `path`.
pub fn modified_local(path: &Path) -> CoreResult<NaiveDateTime> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

fn retain_modified<F>(images: &mut Vec<PathBuf>, keep: F) -> CoreResult<()>
where
    F: Fn(NaiveDateTime) -> bool,
{
    let mut kept = Vec::with_capacity(images.len());
    for image in images.drain(..) {
        if keep(modified_local(&image)?) {
            kept.push(image);
        }
    }
    *images = kept;
    Ok(())
}
