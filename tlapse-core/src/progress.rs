//! Encoder progress monitoring.
//!
//! ffmpeg started with `-progress pipe:1` writes `key=value` lines to stdout.
//! Only `frame=<n>` matters here: it drives a bounded indicator whose total is
//! the number of selected images.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{BufRead, IsTerminal};
use std::time::Duration;

const PROGRESS_TEMPLATE: &str =
    "  ⧖ Encoding: {percent:>3}% [{bar:30}] {pos}/{len} frames ({elapsed_precise} / {eta_precise})";

/// Extracts the frame number from a `frame=<n>` progress line.
#[must_use]
pub fn parse_frame_line(line: &str) -> Option<u64> {
    line.trim()
        .strip_prefix("frame=")
        .and_then(|value| value.trim().parse().ok())
}

/// Bounded progress indicator fed by the encoder's progress stream.
pub struct ProgressMonitor {
    bar: ProgressBar,
}

impl ProgressMonitor {
    /// Creates a monitor for `total_frames` frames. When `visible` is false,
    /// or stderr is not a terminal, the indicator tracks progress silently.
    pub fn new(total_frames: u64, visible: bool) -> Self {
        if !visible || !std::io::stderr().is_terminal() {
            return Self::hidden(total_frames);
        }

        let bar = ProgressBar::new(total_frames);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(style);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Monitor that never draws.
    pub fn hidden(total_frames: u64) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(total_frames), ProgressDrawTarget::hidden()),
        }
    }

    /// Applies one reported frame count. Progress never moves backwards.
    pub fn observe(&self, frame: u64) {
        if frame > self.bar.position() {
            self.bar.set_position(frame);
        }
    }

    /// Current indicator position.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Reads `reader` until it closes and returns the final position.
    ///
    /// Lines other than `frame=<n>` and malformed frame numbers are ignored.
    /// A read error ends monitoring the same way EOF does; the encoder's exit
    /// status decides whether the run succeeded.
    pub fn monitor<R: BufRead>(&self, reader: R) -> u64 {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::debug!("Progress stream closed with error: {e}");
                    break;
                }
            };
            if let Some(frame) = parse_frame_line(&line) {
                self.observe(frame);
            }
        }
        self.bar.finish_and_clear();
        self.position()
    }
}
