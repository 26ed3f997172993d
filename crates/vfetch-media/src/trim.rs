//! Segment trimming with FFmpeg.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Default FFmpeg executable.
pub const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

/// Cuts `[start, start + duration)` out of a local media file.
#[async_trait]
pub trait Trimmer: Send + Sync {
    async fn trim(&self, input: &Path, start: f64, duration: f64, output: &Path)
        -> MediaResult<()>;
}

/// FFmpeg backed trimmer.
///
/// Video is re-encoded with libx264 so cuts land on exact frames; audio is
/// stream-copied. One encoder thread per trim.
#[derive(Debug, Clone)]
pub struct FfmpegTrimmer {
    runner: FfmpegRunner,
    video_codec: String,
    audio_codec: String,
    threads: u32,
}

impl Default for FfmpegTrimmer {
    fn default() -> Self {
        Self::new(FfmpegRunner::new(DEFAULT_FFMPEG_BIN))
    }
}

impl FfmpegTrimmer {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self {
            runner,
            video_codec: "libx264".to_string(),
            audio_codec: "copy".to_string(),
            threads: 1,
        }
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// FFmpeg command for one trim.
    pub fn build_command(
        &self,
        input: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .seek(start)
            .duration(duration)
            .video_codec(&self.video_codec)
            .audio_codec(&self.audio_codec)
            .threads(self.threads)
            .log_level("panic")
    }
}

#[async_trait]
impl Trimmer for FfmpegTrimmer {
    async fn trim(
        &self,
        input: &Path,
        start: f64,
        duration: f64,
        output: &Path,
    ) -> MediaResult<()> {
        info!(
            "Trimming segment: {} -> {} (start: {:.2}s, duration: {:.2}s)",
            input.display(),
            output.display(),
            start,
            duration
        );

        let cmd = self.build_command(input, start, duration, output);
        self.runner.run(&cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_command() {
        let trimmer = FfmpegTrimmer::default();
        let cmd = trimmer.build_command(Path::new("tmp/src.mp4"), 1.5, 10.75, Path::new("out/clip.mp4"));
        let args = cmd.build_args();

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss > input, "seek must follow the input for accurate cuts");
        assert_eq!(args[ss + 1], "1.500");
        assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "10.750"));
        assert!(args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264"));
        assert!(args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "copy"));
        assert_eq!(args.last().unwrap(), "out/clip.mp4");
    }

    #[test]
    fn test_threads_never_zero() {
        let trimmer = FfmpegTrimmer::default().with_threads(0);
        let args = trimmer
            .build_command(Path::new("a"), 0.0, 1.0, Path::new("b"))
            .build_args();
        assert!(args.windows(2).any(|w| w[0] == "-threads" && w[1] == "1"));
    }
}
