//! Category taxonomy and directory derivation.
//!
//! A taxonomy is a forest of named categories. Every non-root category maps
//! to a nested directory built from its ancestors, e.g.
//! `1_Sports/7_Racquet sports/42_Playing squash`. Root categories contribute
//! no segment of their own.
//!
//! The taxonomy is built once at startup and shared read-only afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::sanitize_segment;

/// Upper bound on ancestor chain length before a cycle is assumed.
pub const MAX_TAXONOMY_DEPTH: usize = 64;

/// Result type for taxonomy operations.
pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Errors raised while loading or querying a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("malformed taxonomy: node {node_id} references missing parent {parent_id}")]
    MalformedTaxonomy { node_id: i64, parent_id: i64 },

    #[error("taxonomy cycle detected while resolving node {node_id} (depth > {max_depth})")]
    TaxonomyCycleDetected { node_id: i64, max_depth: usize },

    #[error("unknown category id {0}")]
    UnknownCategory(i64),
}

/// One taxonomy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: i64,
    /// `None` marks a root category.
    pub parent_id: Option<i64>,
    pub name: String,
}

impl CategoryNode {
    pub fn new(id: i64, parent_id: Option<i64>, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
        }
    }

    /// Path segment for this node: `<id>_<sanitized-name>`.
    pub fn dir_segment(&self) -> String {
        format!("{}_{}", self.id, sanitize_segment(&self.name))
    }
}

/// Immutable category lookup with pre-resolved directories.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    nodes: HashMap<i64, CategoryNode>,
    dirs: HashMap<i64, PathBuf>,
    labels: HashMap<String, i64>,
}

impl Taxonomy {
    /// Build a taxonomy and resolve every node's directory.
    ///
    /// Later nodes replace earlier ones with the same id, and the last node
    /// carrying a given name owns that label.
    ///
    /// # Errors
    /// - `MalformedTaxonomy` if a parent id is not present
    /// - `TaxonomyCycleDetected` if an ancestor chain exceeds `MAX_TAXONOMY_DEPTH`
    pub fn load(nodes: impl IntoIterator<Item = CategoryNode>) -> TaxonomyResult<Self> {
        let mut by_id = HashMap::new();
        let mut labels = HashMap::new();
        for node in nodes {
            labels.insert(node.name.clone(), node.id);
            by_id.insert(node.id, node);
        }

        // Validate in id order so the reported node is stable across runs
        let mut ids: Vec<i64> = by_id.keys().copied().collect();
        ids.sort_unstable();

        for id in &ids {
            let node = &by_id[id];
            if let Some(parent_id) = node.parent_id {
                if !by_id.contains_key(&parent_id) {
                    return Err(TaxonomyError::MalformedTaxonomy {
                        node_id: node.id,
                        parent_id,
                    });
                }
            }
        }

        let mut dirs = HashMap::with_capacity(ids.len());
        for id in ids {
            let dir = build_dir(&by_id, id)?;
            dirs.insert(id, dir);
        }

        Ok(Self {
            nodes: by_id,
            dirs,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Category id for a label name.
    pub fn label_id(&self, label: &str) -> Option<i64> {
        self.labels.get(label).copied()
    }

    /// Relative directory of a category (empty for roots).
    pub fn resolve_dir(&self, id: i64) -> TaxonomyResult<&Path> {
        self.dirs
            .get(&id)
            .map(PathBuf::as_path)
            .ok_or(TaxonomyError::UnknownCategory(id))
    }

    /// Iterate over every resolved category directory.
    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.dirs.values().map(PathBuf::as_path)
    }
}

/// Walk from `id` up to its root, collecting segments, then reverse.
fn build_dir(nodes: &HashMap<i64, CategoryNode>, id: i64) -> TaxonomyResult<PathBuf> {
    let mut segments = Vec::new();
    let mut current = nodes.get(&id).ok_or(TaxonomyError::UnknownCategory(id))?;

    while let Some(parent_id) = current.parent_id {
        if segments.len() >= MAX_TAXONOMY_DEPTH {
            return Err(TaxonomyError::TaxonomyCycleDetected {
                node_id: id,
                max_depth: MAX_TAXONOMY_DEPTH,
            });
        }
        segments.push(current.dir_segment());
        current = nodes
            .get(&parent_id)
            .ok_or(TaxonomyError::MalformedTaxonomy {
                node_id: current.id,
                parent_id,
            })?;
    }

    Ok(segments.iter().rev().collect())
}
