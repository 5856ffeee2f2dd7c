// tlapse-core/tests/common/mod.rs
//
// Shared fixtures for the orchestrator tests: a scripted encoder and a
// temporary camera/video tree.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::NaiveDate;
use tempfile::TempDir;
use tlapse_core::config::Settings;
use tlapse_core::error::{CoreResult, encoder_launch_error};
use tlapse_core::external::{EncoderExit, EncoderInvocation, EncoderProcess, EncoderSpawner};

/// Encoder process that replays a canned progress stream.
pub struct MockProcess {
    stream: Option<Box<dyn BufRead + Send>>,
    exit: EncoderExit,
}

impl EncoderProcess for MockProcess {
    fn take_progress_stream(&mut self) -> Option<Box<dyn BufRead + Send>> {
        self.stream.take()
    }

    fn wait(&mut self) -> CoreResult<EncoderExit> {
        Ok(self.exit.clone())
    }
}

/// Spawner that records every invocation and behaves as scripted.
#[derive(Clone)]
pub struct MockSpawner {
    progress: String,
    exit: EncoderExit,
    output_size: Option<u64>,
    fail_launch: bool,
    calls: Rc<RefCell<Vec<EncoderInvocation>>>,
}

impl MockSpawner {
    /// Successful encoder reporting one `frame=` line per frame and writing
    /// an output file of `output_size` bytes.
    pub fn succeeding(frames: u64, output_size: u64) -> Self {
        let progress = (1..=frames)
            .map(|n| format!("frame={n}\nfps=25.0\nprogress=continue\n"))
            .collect::<String>()
            + "progress=end\n";
        Self {
            progress,
            exit: EncoderExit::success(),
            output_size: Some(output_size),
            fail_launch: false,
            calls: Rc::default(),
        }
    }

    /// Encoder that exits with `code` after printing `stderr` lines.
    pub fn failing(code: i32, stderr: &[&str]) -> Self {
        Self {
            progress: "frame=1\n".to_string(),
            exit: EncoderExit::failure(code, stderr.iter().map(|s| s.to_string()).collect()),
            output_size: None,
            fail_launch: false,
            calls: Rc::default(),
        }
    }

    /// Encoder binary that cannot be started.
    pub fn missing_binary() -> Self {
        Self {
            fail_launch: true,
            ..Self::failing(127, &[])
        }
    }

    /// Successful exit without producing an output file.
    pub fn without_output() -> Self {
        Self {
            output_size: None,
            ..Self::succeeding(1, 0)
        }
    }

    pub fn calls(&self) -> Vec<EncoderInvocation> {
        self.calls.borrow().clone()
    }
}

impl EncoderSpawner for MockSpawner {
    type Process = MockProcess;

    fn spawn(&self, invocation: &EncoderInvocation) -> CoreResult<Self::Process> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.fail_launch {
            return Err(encoder_launch_error(
                invocation.program().display().to_string(),
                io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            ));
        }

        if let Some(size) = self.output_size {
            let output = invocation
                .get_args()
                .last()
                .map(PathBuf::from)
                .expect("invocation has an output path");
            File::create(&output)?.set_len(size)?;
        }

        Ok(MockProcess {
            stream: Some(Box::new(Cursor::new(self.progress.clone().into_bytes()))),
            exit: self.exit.clone(),
        })
    }
}

/// Temporary image and video tree with settings pointing into it.
pub struct Fixture {
    pub root: TempDir,
    pub settings: Settings,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let mut settings = Settings::default();
        settings.image_input.folder = root.path().join("images");
        settings.video_output.folder = root.path().join("videos");
        settings.encoder.manifest = root.path().join("ffmpeg_images.txt");
        settings.metadata.save_to_file = true;
        Self { root, settings }
    }

    /// Creates `count` images named `img_0000.jpg`.. in the folder for `date`.
    pub fn add_images(&self, date: NaiveDate, count: usize) -> Vec<PathBuf> {
        let folder = self
            .settings
            .image_input
            .folder
            .join(date.format("%Y/%m/%d").to_string());
        fs::create_dir_all(&folder).expect("create image folder");
        (0..count)
            .map(|i| {
                let path = folder.join(format!("img_{i:04}.jpg"));
                File::create(&path).expect("create image");
                path
            })
            .collect()
    }

    pub fn manifest(&self) -> &Path {
        &self.settings.encoder.manifest
    }
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
}
