//! Bounded fan-out of entries over the acquisition worker.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use vfetch_models::{AcquisitionOutcome, VideoEntry};

use crate::acquisition::AcquisitionWorker;

/// Runs a batch of entries with at most `worker_count` in flight.
#[derive(Clone)]
pub struct JobScheduler {
    worker: Arc<AcquisitionWorker>,
    worker_count: usize,
}

impl JobScheduler {
    pub fn new(worker: Arc<AcquisitionWorker>, worker_count: usize) -> Self {
        Self {
            worker,
            worker_count: worker_count.max(1),
        }
    }

    /// Process every entry and return one outcome per distinct id.
    ///
    /// Duplicate ids keep their first occurrence. Outcomes arrive in
    /// completion order. A panicking worker becomes a failed outcome for its
    /// entry and the rest of the batch carries on.
    pub async fn run(&self, entries: Vec<VideoEntry>) -> Vec<AcquisitionOutcome> {
        let entries = dedup_by_id(entries);
        let total = entries.len();
        info!(total, workers = self.worker_count, "Starting batch");

        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let mut tasks = JoinSet::new();

        for entry in entries {
            let worker = self.worker.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                // Only fails if the semaphore is closed, which never happens here
                let _permit = semaphore.acquire_owned().await.ok();

                match AssertUnwindSafe(worker.process(&entry)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        error!(id = %entry.id, reason = %reason, "Worker panicked");
                        AcquisitionOutcome::failed(
                            &entry.id,
                            format!("[internal] worker panicked: {}", reason),
                        )
                    }
                }
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    outcomes.push(outcome);
                    debug!(done = outcomes.len(), total, "Progress");
                }
                Err(e) => error!(error = %e, "Acquisition task did not complete"),
            }
        }

        info!(total, completed = outcomes.len(), "Batch finished");
        outcomes
    }
}

fn dedup_by_id(entries: Vec<VideoEntry>) -> Vec<VideoEntry> {
    let mut seen = HashSet::new();
    let before = entries.len();
    let unique: Vec<VideoEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect();
    if unique.len() < before {
        debug!(dropped = before - unique.len(), "Dropped duplicate ids");
    }
    unique
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use vfetch_media::{Fetcher, MediaResult, Trimmer};
    use vfetch_models::{PathResolver, Subset};

    /// Tracks peak concurrency; panics for one chosen URL.
    #[derive(Default)]
    struct CountingFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        panic_on: Option<String>,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &str, output_path: &Path) -> MediaResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic_on.as_deref().is_some_and(|p| url.ends_with(p)) {
                panic!("boom");
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            tokio::fs::write(output_path, b"video").await?;
            Ok(())
        }
    }

    struct NoopTrimmer;

    #[async_trait]
    impl Trimmer for NoopTrimmer {
        async fn trim(&self, _: &Path, _: f64, _: f64, _: &Path) -> MediaResult<()> {
            Ok(())
        }
    }

    fn id(n: usize) -> String {
        format!("video{:06}", n)
    }

    fn scheduler(
        fetcher: Arc<CountingFetcher>,
        workers: usize,
    ) -> (JobScheduler, tempfile::TempDir, tempfile::TempDir) {
        let root = tempfile::tempdir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let worker = AcquisitionWorker::new(
            Arc::new(PathResolver::flat(root.path())),
            fetcher,
            Arc::new(NoopTrimmer),
            tmp.path(),
        );
        (JobScheduler::new(Arc::new(worker), workers), root, tmp)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_respects_worker_count() {
        let fetcher = Arc::new(CountingFetcher::default());
        let (scheduler, _root, _tmp) = scheduler(fetcher.clone(), 2);

        let entries = (0..8).map(|n| VideoEntry::whole(id(n), Subset::Training)).collect();
        let outcomes = scheduler.run(entries).await;

        assert_eq!(outcomes.len(), 8);
        assert!(outcomes.iter().all(|o| o.success));
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_duplicates_processed_once() {
        let fetcher = Arc::new(CountingFetcher::default());
        let (scheduler, _root, _tmp) = scheduler(fetcher.clone(), 4);

        let entries = vec![
            VideoEntry::whole(id(1), Subset::Training),
            VideoEntry::whole(id(1), Subset::Training),
            VideoEntry::whole(id(2), Subset::Training),
        ];
        let outcomes = scheduler.run(entries).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_outcome() {
        let fetcher = Arc::new(CountingFetcher {
            panic_on: Some(id(3)),
            ..Default::default()
        });
        let (scheduler, _root, _tmp) = scheduler(fetcher, 2);

        let entries = (1..=4).map(|n| VideoEntry::whole(id(n), Subset::Validation)).collect();
        let outcomes = scheduler.run(entries).await;

        assert_eq!(outcomes.len(), 4);
        let failed: Vec<_> = outcomes.iter().filter(|o| !o.success).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, id(3));
        assert_eq!(failed[0].message, "[internal] worker panicked: boom");
    }

    #[test]
    fn test_dedup_keeps_first() {
        let entries = vec![
            VideoEntry::whole("a", Subset::Training),
            VideoEntry::whole("b", Subset::Training),
            VideoEntry::whole("a", Subset::Validation),
        ];
        let unique = dedup_by_id(entries);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].subset, Subset::Training);
    }
}
