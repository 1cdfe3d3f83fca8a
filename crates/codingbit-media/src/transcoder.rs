use anyhow::{anyhow, Result};
use async_trait::async_trait;
use codingbit_core::Config;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::TranscodeError;
use crate::profile::TranscodeProfile;

/// Invokes an external transcoder on staged files.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Transcode `input` into `output` in a single attempt. The output file
    /// exists only if this returns Ok.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &TranscodeProfile,
    ) -> Result<(), TranscodeError>;
}

/// Transcoder backed by an ffmpeg binary on the host.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Result<Self> {
        // The path ends up on a command line; refuse anything that could
        // smuggle shell metacharacters through a misconfigured deployment.
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c)) {
            return Err(anyhow!(
                "Invalid ffmpeg path: contains dangerous characters"
            ));
        }
        if timeout.is_zero() {
            return Err(anyhow!("Transcode timeout must be non-zero"));
        }

        Ok(FfmpegTranscoder {
            ffmpeg_path,
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        FfmpegTranscoder::new(
            config.ffmpeg_path.clone(),
            Duration::from_secs(config.transcode_timeout_secs),
        )
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        profile: &TranscodeProfile,
    ) -> Result<(), TranscodeError> {
        let args = profile.ffmpeg_args(input, output);
        debug!(command = %self.ffmpeg_path, ?args, "Running transcoder");

        let start = Instant::now();

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| TranscodeError::Spawn {
            command: self.ffmpeg_path.clone(),
            source: e,
        })?;

        // On timeout the wait future is dropped, and kill_on_drop reaps the
        // child. The same holds if the caller's request is cancelled.
        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        let process_output = match result {
            Ok(wait_result) => wait_result.map_err(|e| TranscodeError::Spawn {
                command: self.ffmpeg_path.clone(),
                source: e,
            })?,
            Err(_) => {
                return Err(TranscodeError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !process_output.status.success() {
            let stderr = String::from_utf8_lossy(&process_output.stderr);
            return Err(TranscodeError::Failed {
                stderr: stderr_tail(&stderr),
            });
        }

        info!(
            input = %input.display(),
            output = %output.display(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Transcode finished"
        );
        Ok(())
    }
}

/// ffmpeg reports the root cause at the end of its stderr stream, so keep
/// the tail when the full output is too long to surface.
fn stderr_tail(stderr: &str) -> String {
    const MAX_LEN: usize = 2000;

    let trimmed = stderr.trim();
    if trimmed.len() <= MAX_LEN {
        return trimmed.to_string();
    }

    let mut start = trimmed.len() - MAX_LEN;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}
