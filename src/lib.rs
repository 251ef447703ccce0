#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod jellyfin;
pub mod lock;
pub mod mover;
pub mod relocation;
pub mod scheduler;

pub use cli::{Cli, Commands, KindArg, default_config_path};
pub use config::{ArchiverConfig, ConfigError, PathResolver, ScheduleConfig};
pub use error::{AppError, FetchError, Result};
pub use format::FormatFilter;
pub use jellyfin::{Catalog, Item, ItemKind, JellyfinClient, Library, LibraryKind};
pub use lock::BackupLockGuard;
pub use mover::{DryRunMover, Mover, NativeMover};
pub use relocation::{PauseSwitch, Relocator, RunOutcome, RunReport, SeasonGate};
pub use scheduler::{ScheduledJob, Scheduler};
