//! Utility functions for identifier validation and path segments.

/// Length of a YouTube video identifier.
const YOUTUBE_ID_LEN: usize = 11;

/// Check if string contains only valid YouTube ID characters
fn is_valid_youtube_id_chars(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Check whether `id` looks like a YouTube video identifier.
///
/// YouTube IDs are exactly 11 characters drawn from alphanumerics,
/// hyphens and underscores.
pub fn is_valid_youtube_id(id: &str) -> bool {
    id.len() == YOUTUBE_ID_LEN && is_valid_youtube_id_chars(id)
}

/// Make a display name usable as a single path segment.
///
/// Path separators are replaced with the literal `or`, so
/// `"Tennis/Badminton"` becomes `"TennisorBadminton"`.
pub fn sanitize_segment(name: &str) -> String {
    name.replace(&['/', '\\'][..], "or")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_youtube_ids() {
        assert!(is_valid_youtube_id("dQw4w9WgXcQ"));
        assert!(is_valid_youtube_id("abc-def_123"));
    }

    #[test]
    fn test_invalid_youtube_ids() {
        assert!(!is_valid_youtube_id(""));
        assert!(!is_valid_youtube_id("abc123"));
        assert!(!is_valid_youtube_id("abc123def45x"));
        assert!(!is_valid_youtube_id("abc123def!!"));
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Playing squash"), "Playing squash");
        assert_eq!(sanitize_segment("Tennis/Badminton"), "TennisorBadminton");
        assert_eq!(sanitize_segment(r"a\b/c"), "aorborc");
    }
}
