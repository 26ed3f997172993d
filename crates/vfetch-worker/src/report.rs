//! Download report persistence.

use std::path::{Path, PathBuf};

use tracing::info;
use vfetch_models::AcquisitionOutcome;

use crate::error::{WorkerError, WorkerResult};

/// Writes the run's outcomes as a JSON array of `[id, success, message]`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `outcomes`, replacing any previous report.
    pub async fn write(&self, outcomes: &[AcquisitionOutcome]) -> WorkerResult<()> {
        let json = serde_json::to_string(outcomes)
            .map_err(|e| WorkerError::report(&self.path, e.to_string()))?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| WorkerError::report(&self.path, e.to_string()))?;

        info!(path = %self.path.display(), entries = outcomes.len(), "Report written");
        Ok(())
    }
}

/// Counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub ok: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[AcquisitionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.total += 1;
            if !outcome.success {
                summary.failed += 1;
            } else if outcome.is_ignored() {
                summary.ignored += 1;
            } else {
                summary.ok += 1;
            }
            summary
        })
    }

    pub fn log(&self) {
        info!(
            total = self.total,
            ok = self.ok,
            ignored = self.ignored,
            failed = self.failed,
            "Run complete"
        );
    }
}
