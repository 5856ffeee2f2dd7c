//! Settings model for the tlapse-core library.
//!
//! Settings are read from a YAML document, deserialized into typed sections
//! and validated once. A validated `Settings` value is passed by reference to
//! every component and never mutated during a run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tlapse_core::config::Settings;
//!
//! let settings = Settings::from_file("config.yaml").unwrap();
//! println!("images are read from {}", settings.image_input.folder.display());
//! ```

mod template;

use crate::error::{CoreError, CoreResult};
use chrono::NaiveTime;
use log::LevelFilter;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

pub use template::{format_date, validate_strftime};

// Default constants

/// Default start of the morning-to-morning window.
pub const DEFAULT_MORNING_TIME: &str = "06:00";

/// Default encoder executable, resolved through `PATH`.
pub const DEFAULT_ENCODER_BINARY: &str = "ffmpeg";

/// Default location of the concatenation manifest (relative to the working directory).
pub const DEFAULT_MANIFEST_PATH: &str = "ffmpeg_images.txt";

/// Default log folder.
pub const DEFAULT_LOG_FOLDER: &str = "logs";

/// Default log file name inside the log folder.
pub const DEFAULT_LOG_FILENAME: &str = "timelapse.log";

/// Default file log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default timestamp format for log lines.
pub const DEFAULT_LOG_DATEFMT: &str = "%Y-%m-%d %H:%M:%S";

/// Highest constant-rate-factor accepted by any supported encoder.
pub const MAX_CRF: u8 = 63;

/// Complete, validated tlapse settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Where the captured images live and how they are laid out.
    pub image_input: ImageInputSettings,

    /// Where videos are written and how they are encoded.
    pub video_output: VideoOutputSettings,

    /// Output file naming rules.
    pub filename: FilenameSettings,

    #[serde(default)]
    pub metadata: MetadataSettings,

    #[serde(default)]
    pub log: LogSettings,

    #[serde(default)]
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageInputSettings {
    /// Root folder containing the dated image folders
    pub folder: PathBuf,

    /// strftime template turning a date into a sub folder (e.g. `%Y/%m/%d`)
    pub folder_structure: String,

    /// File name ending of the images to pick up (e.g. `.jpg`)
    pub extension: String,

    /// Select from `morning_time` on the date until `morning_time` on the next day
    #[serde(default)]
    pub morning_to_morning: bool,

    #[serde(
        default = "default_morning_time",
        deserialize_with = "deserialize_hh_mm"
    )]
    pub morning_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoOutputSettings {
    /// Root folder for the produced videos
    pub folder: PathBuf,

    /// strftime template turning a date into a sub folder of `folder`
    pub folder_structure: String,

    /// ffmpeg filter graph passed with `-vf`
    pub video_filter: String,

    /// ffmpeg video codec passed with `-c:v`
    pub codec: String,

    /// Constant rate factor (0-63)
    pub crf: u8,

    #[serde(deserialize_with = "deserialize_scalar")]
    pub preset: String,

    #[serde(deserialize_with = "deserialize_scalar")]
    pub min_bitrate: String,

    /// Used both as the target (`-b:v`) and the upper bound (`-maxrate`)
    #[serde(deserialize_with = "deserialize_scalar")]
    pub max_bitrate: String,

    #[serde(deserialize_with = "deserialize_scalar")]
    pub buffer_size: String,

    /// Frame size such as `1920x1080`
    #[serde(deserialize_with = "deserialize_scalar")]
    pub video_size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilenameSettings {
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub suffix: String,

    /// Container extension; the leading dot is optional
    pub extension: String,

    /// Append a qualifier describing the encoding parameters to the file name
    #[serde(default)]
    pub append_metadata: bool,
}

impl FilenameSettings {
    /// Extension with exactly one leading dot.
    pub fn normalized_extension(&self) -> String {
        format!(".{}", self.extension.trim().trim_start_matches('.'))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataSettings {
    /// Write a JSON sidecar next to each produced video
    #[serde(default)]
    pub save_to_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub folder: PathBuf,
    pub filename: String,
    /// error, warn(ing), info, debug, trace or off
    pub level: String,
    /// strftime format for the timestamp of each log line
    pub datefmt: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_LOG_FOLDER),
            filename: DEFAULT_LOG_FILENAME.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
            datefmt: DEFAULT_LOG_DATEFMT.to_string(),
        }
    }
}

impl LogSettings {
    /// Parses the configured level. Accepts the Python-style names
    /// `warning` and `critical` as well as the `log` crate names.
    pub fn level_filter(&self) -> CoreResult<LevelFilter> {
        let level = self.level.trim().to_ascii_lowercase();
        let normalized = match level.as_str() {
            "warning" => "warn",
            "critical" | "fatal" => "error",
            other => other,
        };
        normalized.parse::<LevelFilter>().map_err(|_| {
            CoreError::Config(format!("log.level '{}' is not a known level", self.level))
        })
    }

    /// Full path of the log file.
    pub fn file_path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// ffmpeg executable (name on `PATH` or absolute path)
    pub binary: PathBuf,

    /// Concatenation manifest location, overwritten on every run
    pub manifest: PathBuf,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_ENCODER_BINARY),
            manifest: PathBuf::from(DEFAULT_MANIFEST_PATH),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_input: ImageInputSettings {
                folder: PathBuf::from("."),
                folder_structure: "%Y/%m/%d".to_string(),
                extension: ".jpg".to_string(),
                morning_to_morning: false,
                morning_time: default_morning_time(),
            },
            video_output: VideoOutputSettings {
                folder: PathBuf::from("."),
                folder_structure: "%Y/%m".to_string(),
                video_filter: "format=yuv420p".to_string(),
                codec: "libx264".to_string(),
                crf: 23,
                preset: "medium".to_string(),
                min_bitrate: "2M".to_string(),
                max_bitrate: "8M".to_string(),
                buffer_size: "16M".to_string(),
                video_size: "1920x1080".to_string(),
            },
            filename: FilenameSettings {
                prefix: "timelapse_".to_string(),
                suffix: String::new(),
                extension: ".mp4".to_string(),
                append_metadata: false,
            },
            metadata: MetadataSettings::default(),
            log: LogSettings::default(),
            encoder: EncoderSettings::default(),
        }
    }
}

impl Settings {
    /// Reads, parses and validates a YAML settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML settings document.
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let settings: Settings = serde_yaml::from_str(content).map_err(|e| {
            CoreError::Config(format!("failed to parse settings document: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every value a run depends on.
    pub fn validate(&self) -> CoreResult<()> {
        require_path("image_input.folder", &self.image_input.folder)?;
        validate_strftime(
            "image_input.folder_structure",
            &self.image_input.folder_structure,
        )?;
        require("image_input.extension", &self.image_input.extension)?;

        let video = &self.video_output;
        require_path("video_output.folder", &video.folder)?;
        validate_strftime("video_output.folder_structure", &video.folder_structure)?;
        require("video_output.video_filter", &video.video_filter)?;
        require("video_output.codec", &video.codec)?;
        require("video_output.preset", &video.preset)?;
        require("video_output.min_bitrate", &video.min_bitrate)?;
        require("video_output.max_bitrate", &video.max_bitrate)?;
        require("video_output.buffer_size", &video.buffer_size)?;
        require("video_output.video_size", &video.video_size)?;
        if video.crf > MAX_CRF {
            return Err(CoreError::Config(format!(
                "video_output.crf must be 0-{MAX_CRF}, got {}",
                video.crf
            )));
        }

        require(
            "filename.extension",
            self.filename.extension.trim().trim_start_matches('.'),
        )?;

        self.log.level_filter()?;
        validate_strftime("log.datefmt", &self.log.datefmt)?;
        require("log.filename", &self.log.filename)?;

        require_path("encoder.binary", &self.encoder.binary)?;
        require_path("encoder.manifest", &self.encoder.manifest)?;

        Ok(())
    }
}

fn require(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_path(field: &str, value: &Path) -> CoreResult<()> {
    if value.as_os_str().is_empty() {
        return Err(CoreError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn default_morning_time() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn deserialize_hh_mm<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| {
        serde::de::Error::custom(format!("morning_time '{raw}' is not HH:MM ({e})"))
    })
}

/// Rate-control values are often written unquoted (`preset: 6`, `max_bitrate: 8000000`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Integer(value) => value.to_string(),
        Scalar::Float(value) => value.to_string(),
    })
}
