//! ffmpeg argument construction.
//!
//! The argument order is fixed: global flags, the concat-demuxer input, the
//! rate-control options, the optional pixel format block, then the output.

use crate::config::Settings;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Codecs that need an explicit pixel format and color range, otherwise
/// they pick a layout many players reject.
pub const PIXEL_FORMAT_CODECS: [&str; 3] = ["h264_v4l2m2m", "libx264", "libx265"];

/// Pixel format forced for `PIXEL_FORMAT_CODECS`.
pub const FORCED_PIXEL_FORMAT: &str = "yuv420p";

/// Color range forced for `PIXEL_FORMAT_CODECS` (`tv` is limited range).
pub const FORCED_COLOR_RANGE: &str = "tv";

/// A program plus its argument list, ready to be spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInvocation {
    program: PathBuf,
    args: Vec<OsString>,
}

impl EncoderInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Asks ffmpeg for machine-readable `key=value` progress on stdout and
    /// silences the human-readable statistics. The flags go in front of the
    /// final positional argument so the output path stays last.
    #[must_use]
    pub fn with_progress_reporting(mut self) -> Self {
        let at = self.args.len().saturating_sub(1);
        for (offset, flag) in ["-progress", "pipe:1", "-nostats"].into_iter().enumerate() {
            self.args.insert(at + offset, OsString::from(flag));
        }
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsString> {
        self.args.iter()
    }

    /// Arguments as lossy strings, convenient for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for EncoderInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.args_lossy() {
            if arg.is_empty() || arg.contains([' ', '\'', '"']) {
                write!(f, " '{}'", arg.replace('\'', r"'\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Returns true if `codec` needs the explicit pixel format block.
#[must_use]
pub fn requires_pixel_format(codec: &str) -> bool {
    PIXEL_FORMAT_CODECS.contains(&codec)
}

/// Builds the ffmpeg invocation that encodes `manifest` into `output`.
#[must_use]
pub fn build_encoder_invocation(
    manifest: &Path,
    output: &Path,
    settings: &Settings,
) -> EncoderInvocation {
    let video = &settings.video_output;

    let mut invocation = EncoderInvocation::new(&settings.encoder.binary)
        .args(["-y", "-loglevel", "error", "-hide_banner"])
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(manifest)
        .arg("-vf")
        .arg(&video.video_filter)
        .arg("-c:v")
        .arg(&video.codec)
        .arg("-crf")
        .arg(video.crf.to_string())
        .arg("-preset")
        .arg(&video.preset)
        .arg("-b:v")
        .arg(&video.max_bitrate)
        .arg("-minrate")
        .arg(&video.min_bitrate)
        .arg("-maxrate")
        .arg(&video.max_bitrate)
        .arg("-bufsize")
        .arg(&video.buffer_size)
        .arg("-s")
        .arg(&video.video_size);

    if requires_pixel_format(&video.codec) {
        invocation = invocation
            .args(["-pix_fmt", FORCED_PIXEL_FORMAT])
            .args(["-color_range", FORCED_COLOR_RANGE]);
    }

    invocation.arg(output)
}
