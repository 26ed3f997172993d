//! Acquisition configuration.

use std::path::PathBuf;
use std::time::Duration;

use vfetch_media::{DEFAULT_FFMPEG_BIN, DEFAULT_YTDLP_BIN};
use vfetch_models::DEFAULT_URL_BASE;

use crate::error::{WorkerError, WorkerResult};

/// Acquisition configuration.
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Size of the worker pool
    pub num_jobs: usize,
    /// Shared directory for in-flight downloads (removed at end of run)
    pub tmp_dir: PathBuf,
    /// Root of the output tree
    pub output_dir: PathBuf,
    /// Where the download report is written
    pub report_path: PathBuf,
    /// Download attempts per entry, including the first
    pub max_fetch_attempts: u32,
    /// Prefix for URLs built from video ids
    pub url_base: String,
    /// Downloader executable
    pub ytdlp_bin: String,
    /// FFmpeg executable
    pub ffmpeg_bin: String,
    /// Per-attempt download timeout
    pub fetch_timeout: Option<Duration>,
    /// Per-segment trim timeout
    pub trim_timeout: Option<Duration>,
    /// Debug-level logging
    pub verbose: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            num_jobs: 10,
            tmp_dir: PathBuf::from("tmp"),
            output_dir: PathBuf::from("."),
            report_path: PathBuf::from("download_report.json"),
            max_fetch_attempts: 3,
            url_base: DEFAULT_URL_BASE.to_string(),
            ytdlp_bin: DEFAULT_YTDLP_BIN.to_string(),
            ffmpeg_bin: DEFAULT_FFMPEG_BIN.to_string(),
            fetch_timeout: None,
            trim_timeout: None,
            verbose: false,
        }
    }
}

impl AcquisitionConfig {
    /// Create config from environment variables.
    ///
    /// CLI flags are layered on top with the `with_*` builders.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_fetch_attempts: std::env::var("VFETCH_FETCH_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_fetch_attempts),
            url_base: std::env::var("VFETCH_URL_BASE").unwrap_or(defaults.url_base),
            ytdlp_bin: std::env::var("VFETCH_YTDLP_BIN").unwrap_or(defaults.ytdlp_bin),
            ffmpeg_bin: std::env::var("VFETCH_FFMPEG_BIN").unwrap_or(defaults.ffmpeg_bin),
            report_path: std::env::var("VFETCH_REPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.report_path),
            fetch_timeout: std::env::var("VFETCH_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            trim_timeout: std::env::var("VFETCH_TRIM_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            ..defaults
        }
    }

    pub fn with_num_jobs(mut self, num_jobs: usize) -> Self {
        self.num_jobs = num_jobs;
        self
    }

    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_report_path(mut self, report_path: impl Into<PathBuf>) -> Self {
        self.report_path = report_path.into();
        self
    }

    pub fn with_max_fetch_attempts(mut self, attempts: u32) -> Self {
        self.max_fetch_attempts = attempts;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.num_jobs == 0 {
            return Err(WorkerError::config_error("num_jobs must be at least 1"));
        }
        if self.max_fetch_attempts == 0 {
            return Err(WorkerError::config_error(
                "max_fetch_attempts must be at least 1",
            ));
        }
        if self.tmp_dir.as_os_str().is_empty() {
            return Err(WorkerError::config_error("tmp_dir must not be empty"));
        }
        // The temp dir is deleted at the end of every run, so it must not
        // contain the output tree
        let tmp_dir = std::path::absolute(&self.tmp_dir)
            .map_err(|e| WorkerError::config_error(format!("invalid tmp_dir: {}", e)))?;
        let output_dir = std::path::absolute(&self.output_dir)
            .map_err(|e| WorkerError::config_error(format!("invalid output_dir: {}", e)))?;
        if output_dir.starts_with(&tmp_dir) {
            return Err(WorkerError::config_error(format!(
                "tmp_dir {} must not contain output_dir {}",
                self.tmp_dir.display(),
                self.output_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.max_fetch_attempts, 3);
        assert_eq!(config.report_path, PathBuf::from("download_report.json"));
        assert_eq!(config.url_base, "https://www.youtube.com/watch?v=");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = AcquisitionConfig::default()
            .with_num_jobs(24)
            .with_tmp_dir("scratch")
            .with_output_dir("videos")
            .with_verbose(true);
        assert_eq!(config.num_jobs, 24);
        assert_eq!(config.tmp_dir, PathBuf::from("scratch"));
        assert_eq!(config.output_dir, PathBuf::from("videos"));
        assert!(config.verbose);
    }

    #[test]
    fn test_validate_rejects_zero_jobs() {
        let config = AcquisitionConfig::default().with_num_jobs(0);
        assert!(matches!(config.validate(), Err(WorkerError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = AcquisitionConfig::default().with_max_fetch_attempts(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_output_inside_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let config = AcquisitionConfig::default()
            .with_tmp_dir(dir.path().join("work"))
            .with_output_dir(dir.path().join("work").join("videos"));
        assert!(matches!(config.validate(), Err(WorkerError::ConfigError(_))));

        let config = AcquisitionConfig::default()
            .with_tmp_dir(".")
            .with_output_dir("videos");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_tmp_inside_output() {
        let config = AcquisitionConfig::default()
            .with_tmp_dir("videos/tmp")
            .with_output_dir("videos");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tmp_as_output() {
        let config = AcquisitionConfig::default()
            .with_tmp_dir("videos")
            .with_output_dir("videos");
        assert!(config.validate().is_err());
    }
}
