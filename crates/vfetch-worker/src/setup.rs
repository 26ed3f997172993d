//! Output tree and temp directory lifecycle.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use vfetch_models::{PathResolver, Subset};

use crate::error::WorkerResult;

/// Create every directory the workers will write into.
///
/// Runs before any worker starts so concurrent workers never race on
/// directory creation. Existing directories are left alone.
pub async fn prepare_output_tree(
    resolver: &PathResolver,
    subsets: &[Subset],
) -> WorkerResult<Vec<PathBuf>> {
    let dirs = resolver.setup_dirs(subsets);
    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await?;
    }
    info!(
        root = %resolver.root().display(),
        count = dirs.len(),
        "Output tree ready"
    );
    Ok(dirs)
}

/// Create the shared temp directory.
pub async fn prepare_tmp_dir(tmp_dir: &Path) -> WorkerResult<()> {
    tokio::fs::create_dir_all(tmp_dir).await?;
    debug!(tmp_dir = %tmp_dir.display(), "Temp directory ready");
    Ok(())
}

/// Remove the temp directory and anything left in it.
///
/// Best effort: failures are logged, never returned.
pub async fn cleanup_tmp_dir(tmp_dir: &Path) {
    match tokio::fs::remove_dir_all(tmp_dir).await {
        Ok(()) => debug!(tmp_dir = %tmp_dir.display(), "Removed temp directory"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(
            tmp_dir = %tmp_dir.display(),
            error = %e,
            "Failed to remove temp directory"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flat_tree_and_idempotence() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::flat(dir.path());

        let created = prepare_output_tree(&resolver, &[Subset::Training, Subset::Testing])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert!(dir.path().join("training").is_dir());
        assert!(dir.path().join("test").is_dir());

        // Second call over an existing tree is a no-op
        prepare_output_tree(&resolver, &[Subset::Training]).await.unwrap();
    }

    #[tokio::test]
    async fn test_tmp_dir_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("tmp");

        prepare_tmp_dir(&tmp).await.unwrap();
        tokio::fs::write(tmp.join("leftover.mp4"), b"x").await.unwrap();
        cleanup_tmp_dir(&tmp).await;
        assert!(!tmp.exists());

        // Already gone
        cleanup_tmp_dir(&tmp).await;
    }
}
