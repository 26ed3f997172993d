//! Output path layouts.
//!
//! Two layouts are supported:
//!
//! - **Flat**: `<root>/<subset_dir>/<id>.mp4`, used for identifier lists.
//! - **Taxonomy**: labeled clips go to
//!   `<root>/<category dirs>/<subset>_<id>_<label_id>_<start>_<end>.mp4`
//!   and testing entries to `<root>/testing/<id>.mp4`.
//!
//! Resolution is a pure function of its inputs, which is what lets the
//! worker treat an existing output file as "already done".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::taxonomy::{Taxonomy, TaxonomyError};
use crate::video::{AnnotationSegment, Subset, VideoEntry};

/// Bucket for unlabeled entries in the taxonomy layout.
pub const TESTING_DIR: &str = "testing";

/// Extension of every produced media file.
pub const MEDIA_EXTENSION: &str = "mp4";

/// Result type for path resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("entry {id} ({subset}) needs an annotation to resolve a clip path")]
    MissingAnnotation { id: String, subset: Subset },

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

/// How outputs are organized under the root directory.
#[derive(Debug, Clone)]
pub enum OutputLayout {
    /// One directory per subset, one file per entry.
    Flat,
    /// Category-nested clips plus a `testing` bucket.
    Taxonomy(Arc<Taxonomy>),
}

/// Computes deterministic output paths for entries and segments.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    layout: OutputLayout,
}

impl PathResolver {
    /// Resolver for the identifier-list layout.
    pub fn flat(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: OutputLayout::Flat,
        }
    }

    /// Resolver for the taxonomy layout.
    pub fn taxonomy(root: impl Into<PathBuf>, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            root: root.into(),
            layout: OutputLayout::Taxonomy(taxonomy),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the entry is produced by trimming annotated segments.
    pub fn is_segmented(&self, entry: &VideoEntry) -> bool {
        matches!(self.layout, OutputLayout::Taxonomy(_)) && entry.subset != Subset::Testing
    }

    /// Resolve the output file for an entry, or for one of its segments.
    ///
    /// Whole-file entries ignore `annotation`. Segmented entries require it.
    pub fn resolve(
        &self,
        entry: &VideoEntry,
        annotation: Option<&AnnotationSegment>,
    ) -> ResolveResult<PathBuf> {
        let file_name = format!("{}.{}", entry.id, MEDIA_EXTENSION);

        match &self.layout {
            OutputLayout::Flat => Ok(self
                .root
                .join(entry.subset.flat_dir_name())
                .join(file_name)),

            OutputLayout::Taxonomy(_) if entry.subset == Subset::Testing => {
                Ok(self.root.join(TESTING_DIR).join(file_name))
            }

            OutputLayout::Taxonomy(taxonomy) => {
                let annotation = annotation.ok_or_else(|| ResolveError::MissingAnnotation {
                    id: entry.id.clone(),
                    subset: entry.subset,
                })?;

                let label_id = taxonomy
                    .label_id(&annotation.label)
                    .ok_or_else(|| ResolveError::UnknownLabel(annotation.label.clone()))?;
                let dir = taxonomy.resolve_dir(label_id)?;

                Ok(self.root.join(dir).join(clip_file_name(
                    entry.subset,
                    &entry.id,
                    label_id,
                    annotation,
                )))
            }
        }
    }

    /// Directories that must exist before workers start.
    ///
    /// Taxonomy layouts need every category directory plus the testing
    /// bucket. Flat layouts need one directory per requested subset.
    pub fn setup_dirs(&self, subsets: &[Subset]) -> Vec<PathBuf> {
        match &self.layout {
            OutputLayout::Flat => subsets
                .iter()
                .map(|subset| self.root.join(subset.flat_dir_name()))
                .collect(),
            OutputLayout::Taxonomy(taxonomy) => {
                let mut dirs: Vec<PathBuf> =
                    taxonomy.dirs().map(|dir| self.root.join(dir)).collect();
                dirs.push(self.root.join(TESTING_DIR));
                dirs.sort();
                dirs.dedup();
                dirs
            }
        }
    }
}

/// File name of a trimmed clip: `<subset>_<id>_<label_id>_<start>_<end>.mp4`.
///
/// Segment bounds are rendered with two decimals.
pub fn clip_file_name(
    subset: Subset,
    id: &str,
    label_id: i64,
    annotation: &AnnotationSegment,
) -> String {
    format!(
        "{}_{}_{}_{:.2}_{:.2}.{}",
        subset, id, label_id, annotation.start, annotation.end, MEDIA_EXTENSION
    )
}
