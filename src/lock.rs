use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, SystemTime};

use crate::error::AppError;

const LOCK_FILE: &str = ".jellyvault.lock";

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    pid: u32,
    hostname: String,
    started_at: SystemTime,
    command: String,
}

/// Exclusive hold on a backup root. Released and removed on drop.
pub struct BackupLockGuard {
    lock_path: PathBuf,
    lock_file: File,
}

impl BackupLockGuard {
    /// Try to acquire the lock for `backup_root`, creating the directory if needed
    pub fn try_lock(backup_root: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(backup_root).map_err(|e| AppError::LockError {
            message: format!(
                "Failed to create backup root {}: {}",
                backup_root.display(),
                e
            ),
        })?;

        let lock_path = backup_root.join(LOCK_FILE);

        // Clean up stale locks from dead processes
        if lock_path.exists() {
            Self::cleanup_stale_lock(&lock_path);
        }

        let mut lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .read(true)
            .open(&lock_path)
            .map_err(|e| AppError::LockError {
                message: format!("Failed to open lock file {}: {}", lock_path.display(), e),
            })?;

        if lock_file.try_lock_exclusive().is_err() {
            let (owner_pid, owner_host, locked_for) = Self::read_lock_info(&lock_path).map_or_else(
                || (0, "unknown".to_string(), Duration::ZERO),
                |info| {
                    let locked_for = SystemTime::now()
                        .duration_since(info.started_at)
                        .unwrap_or_default();
                    (info.pid, info.hostname, locked_for)
                },
            );

            return Err(AppError::BackupLocked {
                root: backup_root.to_path_buf(),
                owner_pid,
                owner_host,
                locked_for,
            });
        }

        let info = LockInfo {
            pid: process::id(),
            hostname: hostname::get().map_or_else(
                |_| "unknown".to_string(),
                |h| h.to_string_lossy().to_string(),
            ),
            started_at: SystemTime::now(),
            command: std::env::args().collect::<Vec<_>>().join(" "),
        };

        lock_file.set_len(0).ok();
        lock_file
            .write_all(serde_json::to_string(&info)?.as_bytes())
            .map_err(|e| AppError::LockError {
                message: format!("Failed to write lock info: {e}"),
            })?;
        lock_file.sync_all().ok();

        tracing::debug!("Acquired backup lock {}", lock_path.display());

        Ok(Self {
            lock_path,
            lock_file,
        })
    }

    /// Remove a lock file left behind by a process that no longer exists
    fn cleanup_stale_lock(lock_path: &Path) {
        let Ok(file) = OpenOptions::new().write(true).read(true).open(lock_path) else {
            return;
        };

        // If we can take the lock, nobody holds it right now
        if file.try_lock_exclusive().is_ok() {
            if let Some(info) = Self::read_lock_info(lock_path) {
                if !Self::is_process_alive(info.pid) {
                    tracing::warn!(
                        "Removing stale lock from dead process {} ({}) at {}",
                        info.pid,
                        info.hostname,
                        lock_path.display()
                    );
                    let _ = file.unlock();
                    drop(file);
                    fs::remove_file(lock_path).ok();
                    return;
                }
            }
            let _ = file.unlock();
        }
    }

    fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
        let mut contents = String::new();
        File::open(lock_path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn is_process_alive(pid: u32) -> bool {
        #[cfg(unix)]
        {
            use nix::sys::signal::kill;
            use nix::unistd::Pid;

            let Ok(raw) = i32::try_from(pid) else {
                return false;
            };
            kill(Pid::from_raw(raw), None).is_ok()
        }

        #[cfg(not(unix))]
        {
            // No cheap liveness probe; the flock still protects the tree
            let _ = pid;
            true
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for BackupLockGuard {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
        if let Err(e) = fs::remove_file(&self.lock_path) {
            tracing::warn!(
                "Failed to remove lock file {}: {}",
                self.lock_path.display(),
                e
            );
        }
    }
}
