//! External MP3 encoder collaborator

use crate::error::{PipelineError, PipelineResult};
use crate::options::Quality;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often a running encoder is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Encoder collaborator: PCM container -> final encoded artifact
///
/// On `Err` the caller must not trust anything at `output`.
pub trait AudioEncoder {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        bitrate: &str,
        quality: Quality,
    ) -> PipelineResult<()>;
}

/// Spawns ffmpeg with libmp3lame, bounded by a timeout
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    timeout: Duration,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg", Duration::from_secs(300))
    }
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// True when `<program> -version` runs successfully
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn command(&self, input: &Path, output: &Path, bitrate: &str, quality: Quality) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-codec:a", "libmp3lame", "-b:a", bitrate, "-q:a"])
            .arg(quality.vbr_level().to_string())
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    fn failure(&self, what: impl std::fmt::Display) -> PipelineError {
        PipelineError::ExternalEncoderFailure(format!("{}: {}", self.program.display(), what))
    }

    /// Wait for exit or kill the child once the deadline passes
    fn wait_with_timeout(&self, child: &mut Child) -> PipelineResult<std::process::ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    reap(child);
                    return Err(self.failure(format!(
                        "timed out after {:.1}s",
                        self.timeout.as_secs_f64()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    reap(child);
                    return Err(self.failure(format!("failed to poll: {}", e)));
                }
            }
        }
    }
}

/// Kill the child and wait on it
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        warn!(pid = child.id(), error = %e, "failed to kill encoder");
    }
    if let Err(e) = child.wait() {
        warn!(pid = child.id(), error = %e, "failed to reap encoder");
    }
}

impl AudioEncoder for FfmpegEncoder {
    fn encode(
        &self,
        input: &Path,
        output: &Path,
        bitrate: &str,
        quality: Quality,
    ) -> PipelineResult<()> {
        debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            bitrate,
            %quality,
            "spawning encoder"
        );

        let mut child = self
            .command(input, output, bitrate, quality)
            .spawn()
            .map_err(|e| self.failure(format!("failed to start: {}", e)))?;

        // drain stderr while the wait loop polls
        let stderr = child.stderr.take();
        let stderr_reader = thread::spawn(move || {
            let mut text = String::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_string(&mut text);
            }
            text
        });

        let status = self.wait_with_timeout(&mut child)?;
        let stderr_text = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(self.failure(format!("exited with {}: {}", status, stderr_text.trim())));
        }
        Ok(())
    }
}
