//! Video download using yt-dlp.
//!
//! The worker only sees the [`Fetcher`] capability; [`YtDlpFetcher`] is the
//! production implementation. Retrying is the caller's job: one call is one
//! attempt.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::command::run_captured;
use crate::error::{MediaError, MediaResult};

/// Default downloader executable.
pub const DEFAULT_YTDLP_BIN: &str = "yt-dlp";

/// Default yt-dlp format selector.
const DEFAULT_FORMAT: &str = "mp4";

/// Downloads a whole source video to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` into `output_path`. One call is a single attempt.
    async fn fetch(&self, url: &str, output_path: &Path) -> MediaResult<()>;
}

/// yt-dlp backed fetcher.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary: PathBuf,
    format: String,
    timeout_secs: Option<u64>,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_YTDLP_BIN)
    }
}

impl YtDlpFetcher {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            format: DEFAULT_FORMAT.to_string(),
            timeout_secs: None,
        }
    }

    /// Override the yt-dlp `-f` format selector.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Kill a single attempt after `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Argument vector for one download. The URL follows `--` so it can
    /// never be parsed as an option.
    pub fn build_args(&self, url: &str, output_path: &Path) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, output_path: &Path) -> MediaResult<()> {
        let args = self.build_args(url, output_path);
        debug!("Running yt-dlp: {} {}", self.binary.display(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command.args(&args);
        let output = run_captured(&mut command, self.timeout_secs).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            debug!("yt-dlp stderr: {}", stderr);

            let detail = [stderr.trim(), stdout.trim()]
                .into_iter()
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));

            return Err(MediaError::download_failed(detail));
        }

        info!(url = %url, output = %output_path.display(), "Downloaded video");
        Ok(())
    }
}
