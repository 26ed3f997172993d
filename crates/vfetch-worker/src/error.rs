//! Worker error types.
//!
//! `WorkerError` is fatal and aborts a run. `EntryError` is scoped to one
//! entry and ends up in that entry's outcome message.

use std::path::PathBuf;

use thiserror::Error;
use vfetch_media::MediaError;
use vfetch_models::{ResolveError, TaxonomyError};

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Failed to write report {path}: {message}")]
    Report { path: PathBuf, message: String },

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_input(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn report(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            message: msg.into(),
        }
    }
}

/// Failure of a single entry. The `Display` form is the outcome message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("[validate] invalid video id '{0}'")]
    InvalidId(String),

    #[error("[resolve] {0}")]
    Resolve(String),

    #[error("[download] {detail}")]
    TransientFetch { attempts: u32, detail: String },

    #[error("[download] cannot find the downloaded file for unknown reason")]
    MissingDownloadArtifact,

    /// `index` counts annotations from 1.
    #[error("[trimming {id}_annotation_{index}] {detail}")]
    TrimFailure {
        id: String,
        index: usize,
        detail: String,
    },

    #[error("[trimming {id}_annotation_{index}] cannot find the trimmed file for unknown reason")]
    MissingTrimArtifact { id: String, index: usize },

    #[error("[filesystem] {0}")]
    Filesystem(String),
}

impl EntryError {
    /// Phase tag used in logs.
    pub fn phase(&self) -> &'static str {
        match self {
            EntryError::InvalidId(_) => "validate",
            EntryError::Resolve(_) => "resolve",
            EntryError::TransientFetch { .. } | EntryError::MissingDownloadArtifact => "download",
            EntryError::TrimFailure { .. } | EntryError::MissingTrimArtifact { .. } => "trimming",
            EntryError::Filesystem(_) => "filesystem",
        }
    }
}

impl From<ResolveError> for EntryError {
    fn from(err: ResolveError) -> Self {
        EntryError::Resolve(err.to_string())
    }
}

impl From<MediaError> for EntryError {
    fn from(err: MediaError) -> Self {
        EntryError::Filesystem(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_message() {
        let err = EntryError::TransientFetch {
            attempts: 3,
            detail: "ERROR: Video unavailable".into(),
        };
        assert_eq!(err.to_string(), "[download] ERROR: Video unavailable");
        assert_eq!(err.phase(), "download");
    }

    #[test]
    fn test_trim_messages_name_annotation() {
        let err = EntryError::TrimFailure {
            id: "abc".into(),
            index: 1,
            detail: "exit 1".into(),
        };
        assert_eq!(err.to_string(), "[trimming abc_annotation_1] exit 1");

        let err = EntryError::MissingTrimArtifact {
            id: "abc".into(),
            index: 2,
        };
        assert_eq!(
            err.to_string(),
            "[trimming abc_annotation_2] cannot find the trimmed file for unknown reason"
        );
    }

    #[test]
    fn test_resolve_conversion() {
        let err: EntryError = ResolveError::UnknownLabel("Knitting".into()).into();
        assert_eq!(err.to_string(), "[resolve] unknown label 'Knitting'");
    }
}
