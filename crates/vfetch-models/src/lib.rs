//! Shared data models for the vfetch acquisition pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video entries, subsets and annotated segments
//! - Category taxonomies and their directory derivation
//! - Output path layouts
//! - Per-entry acquisition outcomes
//! - Input file shapes consumed by the CLIs

pub mod input;
pub mod layout;
pub mod outcome;
pub mod taxonomy;
pub mod utils;
pub mod video;

// Re-export common types
pub use input::{parse_id_list, AnnotatedInput, DatabaseRecord, TaxonomyRecord, DEFAULT_URL_BASE};
pub use layout::{
    clip_file_name, OutputLayout, PathResolver, ResolveError, ResolveResult, MEDIA_EXTENSION,
    TESTING_DIR,
};
pub use outcome::AcquisitionOutcome;
pub use taxonomy::{CategoryNode, Taxonomy, TaxonomyError, TaxonomyResult, MAX_TAXONOMY_DEPTH};
pub use utils::{is_valid_youtube_id, sanitize_segment};
pub use video::{AnnotationSegment, SourceLocator, Subset, VideoEntry, VideoError, VideoResult};
