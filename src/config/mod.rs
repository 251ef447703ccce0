mod error;
mod paths;
mod schedule;

pub use error::{ConfigError, Result};
pub use paths::PathResolver;
pub use schedule::ScheduleConfig;

use crate::relocation::{PauseSwitch, SeasonGate};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiverConfig {
    /// Base URL of the Jellyfin server (e.g., "<http://localhost:8096>")
    #[serde(default, alias = "jellyfinUrl")]
    pub jellyfin_url: String,

    #[serde(default, alias = "apiKey")]
    pub api_key: String,

    #[serde(default, alias = "userId")]
    pub user_id: String,

    /// Per-library subfolders are created under this directory
    #[serde(default, alias = "backupFolderPath")]
    pub backup_folder_path: PathBuf,

    /// Libraries the daemon never schedules
    #[serde(default, alias = "excludedLibraries")]
    pub excluded_libraries: Vec<String>,

    /// Extensions eligible for backup, matched case-insensitively
    #[serde(default = "default_supported_formats", alias = "supportedFormats")]
    pub supported_formats: Vec<String>,

    /// Root that relative item paths are resolved against
    #[serde(default, alias = "mediaRoot")]
    pub media_root: PathBuf,

    #[serde(default)]
    pub paused: bool,

    /// While this file exists, relocation waits before each item
    #[serde(default)]
    pub pause_file: Option<PathBuf>,

    #[serde(default = "default_pause_interval_secs")]
    pub pause_interval_secs: u64,

    #[serde(default)]
    pub season_gate: SeasonGate,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_supported_formats() -> Vec<String> {
    [".mkv", ".mp4", ".mp3", ".wav", ".flac", ".aac", ".avi", ".mov"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

const fn default_pause_interval_secs() -> u64 {
    300
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn at_least_one(secs: u64) -> u64 {
    if secs == 0 { 1 } else { secs }
}

impl ArchiverConfig {
    /// Load configuration from a YAML file.
    ///
    /// Required fields are not checked here; relocation calls [`Self::validate`]
    /// at the start of every run.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Fails on the first required field that is empty
    pub fn validate(&self) -> Result<()> {
        let required: [(&'static str, bool); 4] = [
            ("jellyfin_url", self.jellyfin_url.trim().is_empty()),
            ("api_key", self.api_key.trim().is_empty()),
            ("user_id", self.user_id.trim().is_empty()),
            ("backup_folder_path", self.backup_folder_path.as_os_str().is_empty()),
        ];

        match required.into_iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(ConfigError::MissingField { field }),
            None => Ok(()),
        }
    }

    pub fn path_resolver(&self) -> PathResolver {
        PathResolver::new(self.media_root.clone())
    }

    pub fn pause_switch(&self) -> PauseSwitch {
        PauseSwitch::new(self.paused, self.pause_file.clone())
    }

    /// Re-check interval while paused, at least one second
    pub const fn pause_interval(&self) -> Duration {
        Duration::from_secs(at_least_one(self.pause_interval_secs))
    }

    /// HTTP timeout, at least one second
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(at_least_one(self.request_timeout_secs))
    }

    /// Settings re-read from disk while the daemon runs, with the server
    /// connection and backup root held to what the daemon started with.
    ///
    /// The client and the backup lock are built once at startup; a changed
    /// URL, credential or backup path only applies after a restart.
    #[must_use]
    pub fn reloaded(mut self, startup: &Self) -> Self {
        let pinned = [
            ("jellyfin_url", self.jellyfin_url != startup.jellyfin_url),
            ("api_key", self.api_key != startup.api_key),
            ("user_id", self.user_id != startup.user_id),
            ("backup_folder_path", self.backup_folder_path != startup.backup_folder_path),
        ];
        for (field, changed) in pinned {
            if changed {
                tracing::warn!("Ignoring changed '{field}' until the daemon is restarted");
            }
        }

        self.jellyfin_url.clone_from(&startup.jellyfin_url);
        self.api_key.clone_from(&startup.api_key);
        self.user_id.clone_from(&startup.user_id);
        self.backup_folder_path.clone_from(&startup.backup_folder_path);
        self
    }

    pub fn is_excluded(&self, library_id: &str) -> bool {
        self.excluded_libraries.iter().any(|id| id == library_id)
    }
}

#[cfg(test)]
pub(crate) fn test_config(backup_root: &Path) -> ArchiverConfig {
    ArchiverConfig {
        jellyfin_url: "http://localhost:8096".to_string(),
        api_key: "secret".to_string(),
        user_id: "user-1".to_string(),
        backup_folder_path: backup_root.to_path_buf(),
        excluded_libraries: Vec::new(),
        supported_formats: default_supported_formats(),
        media_root: PathBuf::new(),
        paused: false,
        pause_file: None,
        pause_interval_secs: 300,
        season_gate: SeasonGate::default(),
        schedule: ScheduleConfig::default(),
        request_timeout_secs: 30,
    }
}
