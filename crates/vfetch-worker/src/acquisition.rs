//! Per-entry acquisition.
//!
//! One [`AcquisitionWorker::process`] call takes a single entry from "listed"
//! to "on disk": existence check, fetch with bounded retries, optional trim per
//! annotated segment, placement, temp cleanup. Every path out of `process`
//! yields an [`AcquisitionOutcome`]; errors never reach the scheduler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use vfetch_media::{move_file, remove_file_if_exists, Fetcher, Trimmer};
use vfetch_models::{
    is_valid_youtube_id, AcquisitionOutcome, PathResolver, SourceLocator, VideoEntry,
    MEDIA_EXTENSION,
};

use crate::config::AcquisitionConfig;
use crate::error::EntryError;
use crate::retry::{retry_async, RetryPolicy, RetryResult};

/// How an entry finished when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    /// Output already present, nothing fetched.
    Ignored,
    /// Output produced (or every segment already present).
    Completed,
}

/// Executes the acquisition steps for one entry at a time.
///
/// Cheap to share: all collaborators sit behind `Arc`.
pub struct AcquisitionWorker {
    resolver: Arc<PathResolver>,
    fetcher: Arc<dyn Fetcher>,
    trimmer: Arc<dyn Trimmer>,
    tmp_dir: PathBuf,
    retry: RetryPolicy,
    url_base: String,
}

impl AcquisitionWorker {
    pub fn new(
        resolver: Arc<PathResolver>,
        fetcher: Arc<dyn Fetcher>,
        trimmer: Arc<dyn Trimmer>,
        tmp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            trimmer,
            tmp_dir: tmp_dir.into(),
            retry: RetryPolicy::new("download"),
            url_base: vfetch_models::DEFAULT_URL_BASE.to_string(),
        }
    }

    /// Worker wired with the temp dir, retry bound and URL base of `config`.
    pub fn from_config(
        config: &AcquisitionConfig,
        resolver: Arc<PathResolver>,
        fetcher: Arc<dyn Fetcher>,
        trimmer: Arc<dyn Trimmer>,
    ) -> Self {
        Self::new(resolver, fetcher, trimmer, config.tmp_dir.clone())
            .with_max_attempts(config.max_fetch_attempts)
            .with_url_base(config.url_base.clone())
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = self.retry.with_max_attempts(max_attempts);
        self
    }

    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.url_base = url_base.into();
        self
    }

    /// Acquire one entry and describe what happened.
    pub async fn process(&self, entry: &VideoEntry) -> AcquisitionOutcome {
        let result = match validate_entry(entry) {
            Ok(()) if self.resolver.is_segmented(entry) => self.process_segments(entry).await,
            Ok(()) => self.process_whole(entry).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Disposition::Ignored) => {
                debug!(id = %entry.id, "Output exists, skipping");
                AcquisitionOutcome::ignored(&entry.id)
            }
            Ok(Disposition::Completed) => {
                info!(id = %entry.id, subset = %entry.subset, "Acquired");
                AcquisitionOutcome::ok(&entry.id)
            }
            Err(e) => {
                warn!(id = %entry.id, phase = e.phase(), error = %e, "Acquisition failed");
                AcquisitionOutcome::failed(&entry.id, e.to_string())
            }
        }
    }

    async fn process_whole(&self, entry: &VideoEntry) -> Result<Disposition, EntryError> {
        let output = self.resolver.resolve(entry, None)?;
        if path_exists(&output).await {
            return Ok(Disposition::Ignored);
        }

        let tmp_path = self.fetch_source(entry).await?;
        let placed = move_file(&tmp_path, &output).await;
        self.discard_temp(&tmp_path).await;
        placed?;

        debug!(id = %entry.id, output = %output.display(), "Placed");
        Ok(Disposition::Completed)
    }

    async fn process_segments(&self, entry: &VideoEntry) -> Result<Disposition, EntryError> {
        let mut source = None;
        let result = self.trim_segments(entry, &mut source).await;
        if let Some(tmp_path) = source {
            self.discard_temp(&tmp_path).await;
        }
        result
    }

    /// Produce every missing segment. The source is fetched at most once, on
    /// the first segment that needs it, and left in `source` for cleanup.
    async fn trim_segments(
        &self,
        entry: &VideoEntry,
        source: &mut Option<PathBuf>,
    ) -> Result<Disposition, EntryError> {
        let mut produced = 0usize;

        for (position, annotation) in entry.annotations.iter().enumerate() {
            // Annotations are numbered from 1 in messages
            let index = position + 1;
            let output = self.resolver.resolve(entry, Some(annotation))?;
            if path_exists(&output).await {
                debug!(id = %entry.id, index, "Segment exists, skipping");
                continue;
            }

            let input = match source.clone() {
                Some(path) => path,
                None => {
                    let path = self.fetch_source(entry).await?;
                    *source = Some(path.clone());
                    path
                }
            };

            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| EntryError::Filesystem(e.to_string()))?;
            }

            if let Err(e) = self
                .trimmer
                .trim(&input, annotation.start, annotation.duration(), &output)
                .await
            {
                // A half-written clip would be mistaken for a finished one
                remove_file_if_exists(&output).await.ok();
                return Err(EntryError::TrimFailure {
                    id: entry.id.clone(),
                    index,
                    detail: e.detail(),
                });
            }

            if !path_exists(&output).await {
                return Err(EntryError::MissingTrimArtifact {
                    id: entry.id.clone(),
                    index,
                });
            }
            produced += 1;
        }

        debug!(
            id = %entry.id,
            produced,
            total = entry.annotations.len(),
            "Segments done"
        );
        Ok(Disposition::Completed)
    }

    /// Download the entry's source into a fresh temp file.
    async fn fetch_source(&self, entry: &VideoEntry) -> Result<PathBuf, EntryError> {
        let url = entry.source_url(&self.url_base);
        let tmp_path = self
            .tmp_dir
            .join(format!("{}.{}", Uuid::new_v4(), MEDIA_EXTENSION));
        let policy = self.retry.named(format!("download {}", entry.id));

        match retry_async(&policy, || self.fetcher.fetch(&url, &tmp_path)).await {
            RetryResult::Success { attempts, .. } => {
                debug!(id = %entry.id, attempts, tmp = %tmp_path.display(), "Fetched");
            }
            RetryResult::Failed { error, attempts } => {
                self.discard_temp(&tmp_path).await;
                return Err(EntryError::TransientFetch {
                    attempts,
                    detail: error.detail(),
                });
            }
        }

        if !path_exists(&tmp_path).await {
            return Err(EntryError::MissingDownloadArtifact);
        }
        Ok(tmp_path)
    }

    async fn discard_temp(&self, path: &Path) {
        if let Err(e) = remove_file_if_exists(path).await {
            warn!(tmp = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

/// Reject ids that cannot be used as a file name, and identifier-derived
/// sources that are not YouTube ids.
fn validate_entry(entry: &VideoEntry) -> Result<(), EntryError> {
    let id = entry.id.as_str();
    if id.is_empty() || id == "." || id == ".." || id.contains(&['/', '\\'][..]) {
        return Err(EntryError::InvalidId(entry.id.clone()));
    }
    if entry.source == SourceLocator::YouTubeId && !is_valid_youtube_id(id) {
        return Err(EntryError::InvalidId(entry.id.clone()));
    }
    Ok(())
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
