//! Video entry models.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for video model construction.
pub type VideoResult<T> = Result<T, VideoError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VideoError {
    #[error("annotation '{label}' has invalid segment [{start}, {end}]: start must precede end")]
    InvalidSegment { label: String, start: f64, end: f64 },
}

/// Dataset split a video belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subset {
    /// Labeled training split
    Training,
    /// Labeled validation split
    Validation,
    /// Unlabeled split, always downloaded whole
    Testing,
}

impl Subset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Training => "training",
            Subset::Validation => "validation",
            Subset::Testing => "testing",
        }
    }

    /// Directory name used by the flat identifier-list layout.
    pub fn flat_dir_name(&self) -> &'static str {
        match self {
            Subset::Training => "training",
            Subset::Validation => "validation",
            Subset::Testing => "test",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the source media of an entry is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// URL is built from a base URL and the entry id.
    YouTubeId,
    /// Explicit URL given by the input.
    Url(String),
}

/// One labeled clip within a source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnnotation", into = "RawAnnotation")]
pub struct AnnotationSegment {
    /// Category name, resolved against the taxonomy.
    pub label: String,
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
}

impl AnnotationSegment {
    /// Create a segment, rejecting empty or inverted ranges.
    pub fn new(label: impl Into<String>, start: f64, end: f64) -> VideoResult<Self> {
        let label = label.into();
        if !(start < end) {
            return Err(VideoError::InvalidSegment { label, start, end });
        }
        Ok(Self { label, start, end })
    }

    /// Segment length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Wire shape: `{"label": "...", "segment": [start, end]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAnnotation {
    label: String,
    segment: (f64, f64),
}

impl TryFrom<RawAnnotation> for AnnotationSegment {
    type Error = VideoError;

    fn try_from(raw: RawAnnotation) -> VideoResult<Self> {
        AnnotationSegment::new(raw.label, raw.segment.0, raw.segment.1)
    }
}

impl From<AnnotationSegment> for RawAnnotation {
    fn from(segment: AnnotationSegment) -> Self {
        Self {
            label: segment.label,
            segment: (segment.start, segment.end),
        }
    }
}

/// One unit of acquisition work.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEntry {
    /// Source video identifier
    pub id: String,
    /// Split the entry belongs to
    pub subset: Subset,
    /// Where to fetch the media from
    pub source: SourceLocator,
    /// Segments to extract; empty for whole-file entries
    pub annotations: Vec<AnnotationSegment>,
}

impl VideoEntry {
    /// Entry downloaded whole from a URL derived from its id.
    pub fn whole(id: impl Into<String>, subset: Subset) -> Self {
        Self {
            id: id.into(),
            subset,
            source: SourceLocator::YouTubeId,
            annotations: Vec::new(),
        }
    }

    /// Attach an explicit source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source = SourceLocator::Url(url.into());
        self
    }

    /// Attach annotated segments.
    pub fn with_annotations(mut self, annotations: Vec<AnnotationSegment>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Resolve the URL the downloader should fetch.
    pub fn source_url(&self, url_base: &str) -> String {
        match &self.source {
            SourceLocator::YouTubeId => format!("{}{}", url_base, self.id),
            SourceLocator::Url(url) => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_serde_names() {
        let subset: Subset = serde_json::from_str("\"validation\"").unwrap();
        assert_eq!(subset, Subset::Validation);
        assert_eq!(serde_json::to_string(&Subset::Testing).unwrap(), "\"testing\"");
    }

    #[test]
    fn test_flat_dir_names() {
        assert_eq!(Subset::Training.flat_dir_name(), "training");
        assert_eq!(Subset::Testing.flat_dir_name(), "test");
    }

    #[test]
    fn test_annotation_from_json() {
        let ann: AnnotationSegment =
            serde_json::from_str(r#"{"label": "Long jump", "segment": [1.5, 12.25]}"#).unwrap();
        assert_eq!(ann.label, "Long jump");
        assert_eq!(ann.start, 1.5);
        assert_eq!(ann.end, 12.25);
        assert!((ann.duration() - 10.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_annotation_rejects_inverted_segment() {
        let result: Result<AnnotationSegment, _> =
            serde_json::from_str(r#"{"label": "Long jump", "segment": [5.0, 5.0]}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("start must precede end"), "{}", err);

        assert_eq!(
            AnnotationSegment::new("x", 3.0, 1.0).unwrap_err(),
            VideoError::InvalidSegment {
                label: "x".into(),
                start: 3.0,
                end: 1.0
            }
        );
    }

    #[test]
    fn test_source_url() {
        let entry = VideoEntry::whole("dQw4w9WgXcQ", Subset::Training);
        assert_eq!(
            entry.source_url("https://www.youtube.com/watch?v="),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );

        let entry = entry.with_url("https://example.com/v.mp4");
        assert_eq!(entry.source_url("ignored"), "https://example.com/v.mp4");
    }
}
