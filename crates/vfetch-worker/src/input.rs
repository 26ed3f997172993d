//! Reading run inputs from disk.

use std::path::Path;

use tracing::debug;
use vfetch_models::{parse_id_list, AnnotatedInput};

use crate::error::{WorkerError, WorkerResult};

/// Load and parse the annotated input document.
pub async fn load_annotated_input(path: impl AsRef<Path>) -> WorkerResult<AnnotatedInput> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WorkerError::invalid_input(path, e.to_string()))?;

    let input = AnnotatedInput::from_json(&content)
        .map_err(|e| WorkerError::invalid_input(path, e.to_string()))?;

    debug!(
        path = %path.display(),
        categories = input.taxonomy.len(),
        videos = input.database.len(),
        "Loaded annotated input"
    );
    Ok(input)
}

/// Load the ids listed in a delimiter-separated file.
pub async fn load_id_list(path: impl AsRef<Path>) -> WorkerResult<Vec<String>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WorkerError::invalid_input(path, e.to_string()))?;

    let ids = parse_id_list(&content);
    debug!(path = %path.display(), count = ids.len(), "Loaded id list");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_id_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        tokio::fs::write(&path, "aaaaaaaaaaa,1,2\n\nbbbbbbbbbbb\n")
            .await
            .unwrap();

        let ids = load_id_list(&path).await.unwrap();
        assert_eq!(ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]);
    }

    #[tokio::test]
    async fn test_missing_list_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_id_list(dir.path().join("absent.csv")).await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = load_annotated_input(&path).await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidInput { .. }));
    }
}
