use std::path::{Path, PathBuf};

/// Maps item paths reported by the catalog onto the local filesystem.
///
/// Relative paths are joined onto the media root. Absolute paths are used
/// unchanged (`Path::join` semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    media_root: PathBuf,
}

impl PathResolver {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    pub fn resolve(&self, item_path: &str) -> PathBuf {
        self.media_root.join(item_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let resolver = PathResolver::new("/home/user/videos");
        assert_eq!(
            resolver.resolve("Movies/Heat (1995)/Heat.mkv"),
            PathBuf::from("/home/user/videos/Movies/Heat (1995)/Heat.mkv")
        );
    }

    #[test]
    fn test_resolve_absolute_is_kept() {
        let resolver = PathResolver::new("/home/user/videos");
        assert_eq!(
            resolver.resolve("/srv/media/show/s01e01.mkv"),
            PathBuf::from("/srv/media/show/s01e01.mkv")
        );
    }
}
