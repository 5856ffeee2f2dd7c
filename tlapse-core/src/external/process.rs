// ============================================================================
// tlapse-core/src/external/process.rs
// ============================================================================
//
// ENCODER PROCESS: Spawning the encoder and reading its progress channel
//
// The orchestrator never touches `std::process` directly. It asks an
// `EncoderSpawner` for an `EncoderProcess`, reads the progress stream until
// it closes, then waits for the exit status. Tests provide their own spawner
// that replays a synthetic stream.
//
// KEY COMPONENTS:
// - EncoderProcess: a running encoder (progress stream + exit status)
// - EncoderSpawner: creates EncoderProcess values from an EncoderInvocation
// - ProcessSpawner: implementation on top of std::process::Command

use crate::error::{CoreResult, encoder_launch_error};
use crate::external::command::EncoderInvocation;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

/// Number of trailing stderr lines kept for error reports.
pub const STDERR_TAIL_LINES: usize = 20;

/// How a finished encoder exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderExit {
    pub success: bool,
    pub code: Option<i32>,
    /// Last lines the encoder wrote to its error channel
    pub stderr_tail: Vec<String>,
}

impl EncoderExit {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr_tail: Vec::new(),
        }
    }

    pub fn failure(code: i32, stderr_tail: Vec<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stderr_tail,
        }
    }
}

/// Trait representing a running encoder.
pub trait EncoderProcess {
    /// Takes the line-oriented progress stream. Returns `None` once taken.
    fn take_progress_stream(&mut self) -> Option<Box<dyn BufRead + Send>>;

    /// Waits for the encoder to exit.
    fn wait(&mut self) -> CoreResult<EncoderExit>;
}

/// Trait representing something that can start an encoder.
pub trait EncoderSpawner {
    type Process: EncoderProcess;

    fn spawn(&self, invocation: &EncoderInvocation) -> CoreResult<Self::Process>;
}

/// Encoder started with `std::process::Command`.
///
/// stdout carries the `-progress` channel; stderr is drained on a collector
/// thread so a verbose encoder can never block on a full pipe.
pub struct ChildProcess {
    child: Child,
    stdout: Option<Box<dyn BufRead + Send>>,
    stderr_collector: Option<JoinHandle<Vec<String>>>,
}

impl EncoderProcess for ChildProcess {
    fn take_progress_stream(&mut self) -> Option<Box<dyn BufRead + Send>> {
        self.stdout.take()
    }

    fn wait(&mut self) -> CoreResult<EncoderExit> {
        // Dropping an unread stdout lets the encoder finish instead of stalling.
        self.stdout = None;
        let status = self.child.wait()?;
        let stderr_tail = self
            .stderr_collector
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        Ok(EncoderExit {
            success: status.success(),
            code: status.code(),
            stderr_tail,
        })
    }
}

/// Concrete implementation of `EncoderSpawner` using `std::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawner;

impl EncoderSpawner for ProcessSpawner {
    type Process = ChildProcess;

    fn spawn(&self, invocation: &EncoderInvocation) -> CoreResult<Self::Process> {
        let program = invocation.program().display().to_string();
        let mut child = Command::new(invocation.program())
            .args(invocation.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| encoder_launch_error(&program, e))?;

        let stdout = child
            .stdout
            .take()
            .map(|out| Box::new(BufReader::new(out)) as Box<dyn BufRead + Send>);
        let stderr_collector = child.stderr.take().map(spawn_stderr_collector);

        log::debug!("Spawned encoder '{}' (pid {})", program, child.id());
        Ok(ChildProcess {
            child,
            stdout,
            stderr_collector,
        })
    }
}

fn spawn_stderr_collector(stderr: impl Read + Send + 'static) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut lines = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            let cleaned = line.trim();
            if cleaned.is_empty() {
                continue;
            }
            log::debug!(target: "encoder", "{cleaned}");
            lines.push_back(cleaned.to_string());
            if lines.len() > STDERR_TAIL_LINES {
                lines.pop_front();
            }
        }
        lines.into_iter().collect()
    })
}
