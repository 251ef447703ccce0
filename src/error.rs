use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup root {root:?} is locked by process {owner_pid} on {owner_host} for {locked_for:?}")]
    BackupLocked {
        root: PathBuf,
        owner_pid: u32,
        owner_host: String,
        locked_for: Duration,
    },

    #[error("Failed to acquire lock: {message}")]
    LockError { message: String },

    #[error("Failed to create destination directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {from:?} to {to:?}: {reason}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Failed to delete item '{item_id}' from the library: {reason}")]
    DeleteFailed { item_id: String, reason: String },

    #[error("Catalog request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("External service error: {0}")]
    External(String),
}

/// Failure of a read against the catalog.
///
/// Reads never fold this into an empty list; callers decide what an
/// unreachable catalog means for them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_failed_display() {
        let err = AppError::MoveFailed {
            from: PathBuf::from("/media/movies/Heat (1995)"),
            to: PathBuf::from("/backup/lib1/Heat (1995)"),
            reason: "destination already exists".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Heat (1995)"));
        assert!(msg.contains("destination already exists"));
    }

    #[test]
    fn test_directory_create_keeps_source() {
        let err = AppError::DirectoryCreate {
            path: PathBuf::from("/backup/lib1"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/backup/lib1"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_fetch_error_converts() {
        let fetch = FetchError::Status {
            url: "http://localhost:8096/Users/u/Items".to_string(),
            status: 401,
        };
        let err: AppError = fetch.into();
        assert!(matches!(err, AppError::Fetch(FetchError::Status { status: 401, .. })));
        assert!(err.to_string().contains("401"));
    }
}
