//! FFmpeg command builder and subprocess runner.
//!
//! Every external tool is invoked with an argument vector; nothing is ever
//! passed through a shell.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Argument vector for a single-input, single-output FFmpeg invocation.
///
/// Output files are always overwritten (`-y`); callers decide beforehand
/// whether an output should be produced at all.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    /// Everything between the input and the output path
    output_args: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Append a raw output option.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek after opening the input (decode-accurate).
    pub fn seek(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format!("{:.3}", seconds))
    }

    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Limit encoder threads.
    pub fn threads(self, threads: u32) -> Self {
        self.output_arg("-threads").output_arg(threads.to_string())
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
            "-i".to_string(),
            self.input.to_string_lossy().into_owned(),
        ];
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Runner for FFmpeg commands with an optional timeout.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// FFmpeg executable (name on PATH or explicit path)
    binary: PathBuf,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new(crate::trim::DEFAULT_FFMPEG_BIN)
    }
}

impl FfmpegRunner {
    /// Create a new runner for the given executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: None,
        }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.binary.display(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&args);

        let output = run_captured(&mut command, self.timeout_secs).await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        Err(MediaError::ffmpeg_failed(
            format!("FFmpeg exited with {}", output.status),
            Some(stderr),
            output.status.code(),
        ))
    }
}

/// Run a command with captured output, killing it if `timeout_secs` elapses.
pub async fn run_captured(command: &mut Command, timeout_secs: Option<u64>) -> MediaResult<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let result = match timeout_secs {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), command.output()).await {
                Ok(result) => result,
                Err(_) => {
                    // Dropping the future kills the child (kill_on_drop)
                    warn!("Process timed out after {} seconds, killed", secs);
                    return Err(MediaError::Timeout(secs));
                }
            }
        }
        None => command.output().await,
    };

    Ok(result?)
}

/// Resolve a tool binary, either an explicit path or a name on PATH.
pub fn check_binary(binary: impl AsRef<OsStr>) -> MediaResult<PathBuf> {
    let binary = binary.as_ref();
    which::which(binary)
        .map_err(|_| MediaError::BinaryNotFound(binary.to_string_lossy().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .seek(10.0)
            .duration(30.5)
            .video_codec("libx264")
            .audio_codec("copy")
            .threads(1)
            .log_level("panic");

        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y", "-loglevel", "panic", "-i", "input.mp4", "-ss", "10.000", "-t", "30.500",
                "-c:v", "libx264", "-c:a", "copy", "-threads", "1", "output.mp4",
            ]
        );
    }

    #[test]
    fn test_paths_are_single_arguments() {
        let cmd = FfmpegCommand::new("my dir/in \"quoted\".mp4", "out dir/o;rm -rf.mp4");
        let args = cmd.build_args();
        assert!(args.contains(&"my dir/in \"quoted\".mp4".to_string()));
        assert_eq!(args.last().unwrap(), "out dir/o;rm -rf.mp4");
    }

    #[test]
    fn test_missing_binary() {
        let err = check_binary("vfetch-definitely-not-a-real-binary").unwrap_err();
        assert!(matches!(err, MediaError::BinaryNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captured_kills_on_timeout() {
        let started = std::time::Instant::now();
        let mut command = Command::new("sleep");
        command.arg("5");

        let err = run_captured(&mut command, Some(1)).await.unwrap_err();
        assert!(matches!(err, MediaError::Timeout(1)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captured_within_timeout() {
        let mut command = Command::new("echo");
        command.arg("ready");

        let output = run_captured(&mut command, Some(5)).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ready");
    }
}
