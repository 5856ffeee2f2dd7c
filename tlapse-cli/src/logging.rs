// ============================================================================
// tlapse-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and file logging for the tlapse binary
//
// Every record goes through the `log` facade. fern dispatches it to two sinks:
// - stderr, at info level and above, with colors kept
// - the log file from the settings, at the configured level, with ANSI
//   escape sequences stripped
//
// Both sinks use the line format `<timestamp> - <LEVEL> - <message>`, with
// the timestamp rendered by `log.datefmt`.

use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;
use tlapse_core::config::LogSettings;

/// Level used for the console sink.
pub const CONSOLE_LEVEL: LevelFilter = LevelFilter::Info;

/// Formats one log line.
pub fn format_line(timestamp: &str, level: log::Level, message: &str) -> String {
    format!("{timestamp} - {level} - {message}")
}

/// Removes color escape sequences so the log file stays plain text.
pub fn strip_colors(message: &str) -> String {
    strip_ansi_escapes::strip_str(message)
}

/// Installs the global logger. Returns the path of the log file.
pub fn init_logging(settings: &LogSettings) -> Result<PathBuf> {
    let file_level = settings.level_filter()?;
    fs::create_dir_all(&settings.folder).with_context(|| {
        format!(
            "Failed to create log folder '{}'",
            settings.folder.display()
        )
    })?;
    let log_path = settings.file_path();
    let log_file = fern::log_file(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let console_datefmt = settings.datefmt.clone();
    let file_datefmt = settings.datefmt.clone();

    fern::Dispatch::new()
        .level(file_level.max(CONSOLE_LEVEL))
        .chain(
            fern::Dispatch::new()
                .level(CONSOLE_LEVEL)
                .format(move |out, message, record| {
                    let timestamp = chrono::Local::now().format(&console_datefmt).to_string();
                    out.finish(format_args!(
                        "{}",
                        format_line(&timestamp, record.level(), &message.to_string())
                    ))
                })
                .chain(std::io::stderr()),
        )
        .chain(
            fern::Dispatch::new()
                .level(file_level)
                .format(move |out, message, record| {
                    let timestamp = chrono::Local::now().format(&file_datefmt).to_string();
                    let plain = strip_colors(&message.to_string());
                    out.finish(format_args!(
                        "{}",
                        format_line(&timestamp, record.level(), &plain)
                    ))
                })
                .chain(log_file),
        )
        .apply()
        .context("Failed to install logger")?;

    Ok(log_path)
}
