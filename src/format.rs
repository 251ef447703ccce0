use std::collections::HashSet;
use std::path::Path;

/// Allow-list of file extensions eligible for backup.
///
/// Entries are stored lowercased with a leading dot, so ".MKV", "mkv" and
/// ".mkv" in the configuration all mean the same thing. A path without an
/// extension never matches.
#[derive(Debug, Clone, Default)]
pub struct FormatFilter {
    extensions: HashSet<String>,
}

impl FormatFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_lowercase();
                let bare = ext.strip_prefix('.').unwrap_or(&ext);
                format!(".{bare}")
            })
            .filter(|ext| ext.len() > 1)
            .collect();

        Self { extensions }
    }

    pub fn is_supported(&self, path: impl AsRef<Path>) -> bool {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        self.extensions.contains(&extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_filter() -> FormatFilter {
        FormatFilter::new([".mkv", ".mp4", ".avi"])
    }

    #[test]
    fn test_matches_configured_extension() {
        assert!(video_filter().is_supported("/movies/Heat (1995)/Heat.mkv"));
        assert!(video_filter().is_supported("show/s01e01.mp4"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert!(video_filter().is_supported("/a/B.MKV"));
        assert!(video_filter().is_supported("/a/b.Avi"));
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert!(!video_filter().is_supported("/a/b.txt"));
        assert!(!video_filter().is_supported("/a/b.nfo"));
    }

    #[test]
    fn test_rejects_missing_extension() {
        assert!(!video_filter().is_supported("/a/README"));
        assert!(!video_filter().is_supported(""));
        // A leading dot is a hidden file name, not an extension
        assert!(!video_filter().is_supported("/a/.mkv"));
    }

    #[test]
    fn test_only_last_extension_counts() {
        assert!(!video_filter().is_supported("/downloads/movie.mkv.part"));
        assert!(video_filter().is_supported("/downloads/movie.part.mkv"));
    }

    #[test]
    fn test_config_entries_are_normalised() {
        let filter = FormatFilter::new(["MKV", ".Mp4", " .avi ", "", "."]);
        assert!(filter.is_supported("x.mkv"));
        assert!(filter.is_supported("x.MP4"));
        assert!(filter.is_supported("x.avi"));
    }

    #[test]
    fn test_empty_filter_supports_nothing() {
        let filter = FormatFilter::default();
        assert!(!filter.is_supported("x.mkv"));
        // Blank entries never become a match-anything extension
        let blank = FormatFilter::new(["", ".", "  "]);
        assert!(!blank.is_supported("x."));
        assert!(!blank.is_supported("README"));
    }
}
