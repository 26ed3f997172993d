//! Input file shapes consumed by the CLIs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::taxonomy::{CategoryNode, Taxonomy, TaxonomyResult};
use crate::video::{AnnotationSegment, SourceLocator, Subset, VideoEntry};

/// URL prefix for entries without an explicit `url`.
pub const DEFAULT_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Annotated dataset description: a taxonomy plus a video database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedInput {
    pub taxonomy: Vec<TaxonomyRecord>,
    pub database: BTreeMap<String, DatabaseRecord>,
}

/// Taxonomy entry as written in the input file.
///
/// ```json
/// {"parentName": "Health-related self care", "nodeName": "Applying sunscreen",
///  "nodeId": 389, "parentId": 269}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyRecord {
    pub node_id: i64,
    pub node_name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub parent_name: Option<String>,
}

impl From<&TaxonomyRecord> for CategoryNode {
    fn from(record: &TaxonomyRecord) -> Self {
        CategoryNode::new(record.node_id, record.parent_id, record.node_name.clone())
    }
}

/// Database entry for one video. Extra fields such as `duration` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseRecord {
    pub subset: Subset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSegment>,
}

impl AnnotatedInput {
    /// Parse the input JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Build the category taxonomy.
    pub fn build_taxonomy(&self) -> TaxonomyResult<Taxonomy> {
        Taxonomy::load(self.taxonomy.iter().map(CategoryNode::from))
    }

    /// Convert database records into work entries, ordered by id.
    pub fn entries(&self) -> Vec<VideoEntry> {
        self.database
            .iter()
            .map(|(id, record)| VideoEntry {
                id: id.clone(),
                subset: record.subset,
                source: match &record.url {
                    Some(url) => SourceLocator::Url(url.clone()),
                    None => SourceLocator::YouTubeId,
                },
                annotations: record.annotations.clone(),
            })
            .collect()
    }
}

/// Extract video ids from a delimiter-separated list.
///
/// The id is the first comma-separated field of each line. Blank lines and
/// empty ids are skipped; duplicates are kept (the scheduler deduplicates).
pub fn parse_id_list(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
