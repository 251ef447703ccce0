mod pause;
mod season_gate;

pub use pause::PauseSwitch;
pub use season_gate::SeasonGate;

use crate::config::{ArchiverConfig, PathResolver};
use crate::error::{AppError, Result};
use crate::format::FormatFilter;
use crate::jellyfin::{Catalog, Item, Library, LibraryKind};
use crate::mover::Mover;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a relocation run ended, short of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every watched item was looked at
    Completed,
    /// Series gate closed, nothing was moved
    SeasonsIncomplete { watched: usize, total: usize },
    /// An item was already present in the backup; the run stopped there
    AlreadyBackedUp { destination: PathBuf },
    /// A catalog read failed, nothing was moved
    CatalogUnavailable { reason: String },
    /// Library type has no relocation rule
    UnsupportedLibrary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub library_id: String,
    pub outcome: RunOutcome,
    /// Ids of items moved and removed from the library, in processing order
    pub relocated: Vec<String>,
    /// Items skipped for an unsupported format or a movie without its own folder
    pub skipped: usize,
}

impl RunReport {
    fn new(library_id: &str) -> Self {
        Self {
            library_id: library_id.to_string(),
            outcome: RunOutcome::Completed,
            relocated: Vec::new(),
            skipped: 0,
        }
    }

    fn ended(library_id: &str, outcome: RunOutcome) -> Self {
        Self {
            outcome,
            ..Self::new(library_id)
        }
    }
}

/// What gets moved for each eligible item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveUnit {
    /// Movies: the folder holding the file, with subtitles, extras and artwork
    ContainingFolder,
    /// Episodes: the file alone
    File,
}

type Sleeper<'a> = Box<dyn Fn(Duration) + 'a>;

/// Moves watched items of one library into the backup root and removes them
/// from the catalog.
///
/// A run is single-threaded and processes items in catalog order. Any
/// directory, move or delete failure aborts the remaining items of that run.
pub struct Relocator<'a> {
    config: &'a ArchiverConfig,
    catalog: &'a dyn Catalog,
    mover: &'a dyn Mover,
    formats: FormatFilter,
    resolver: PathResolver,
    pause: PauseSwitch,
    pause_interval: Duration,
    sleep: Sleeper<'a>,
    dry_run: bool,
}

impl<'a> Relocator<'a> {
    pub fn new(config: &'a ArchiverConfig, catalog: &'a dyn Catalog, mover: &'a dyn Mover) -> Self {
        Self {
            config,
            catalog,
            mover,
            formats: FormatFilter::new(&config.supported_formats),
            resolver: config.path_resolver(),
            pause: config.pause_switch(),
            pause_interval: config.pause_interval(),
            sleep: Box::new(std::thread::sleep),
            dry_run: false,
        }
    }

    pub fn with_pause(mut self, pause: PauseSwitch) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + 'a) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Dry run: the mover decides what a move does; catalog deletes and
    /// directory creation are only logged
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the rule matching the library type
    pub fn relocate(&self, library: &Library) -> Result<RunReport> {
        match library.kind {
            LibraryKind::Movie => self.relocate_movies(&library.id),
            LibraryKind::Series => self.relocate_series(&library.id),
            LibraryKind::Other => {
                tracing::warn!(
                    "Skipping library '{}'. Unsupported library type: {}",
                    library.id,
                    library.kind
                );
                Ok(RunReport::ended(&library.id, RunOutcome::UnsupportedLibrary))
            }
        }
    }

    /// Move the folder of every watched movie
    pub fn relocate_movies(&self, library_id: &str) -> Result<RunReport> {
        self.config.validate()?;
        tracing::info!("Relocating watched movies of library {library_id}");

        let items = match self.catalog.list_watched_items(library_id) {
            Ok(items) => items,
            Err(e) => return Ok(Self::catalog_unavailable(library_id, &e)),
        };

        let mut report = RunReport::new(library_id);
        self.relocate_items(library_id, &items, MoveUnit::ContainingFolder, &mut report)?;
        Self::log_report(&report);
        Ok(report)
    }

    /// Move every watched episode, but only once each season of the library
    /// has watched content
    pub fn relocate_series(&self, library_id: &str) -> Result<RunReport> {
        self.config.validate()?;
        tracing::info!("Relocating watched episodes of library {library_id}");

        let items = match self.catalog.list_watched_items(library_id) {
            Ok(items) => items,
            Err(e) => return Ok(Self::catalog_unavailable(library_id, &e)),
        };
        let seasons = match self.catalog.list_seasons(library_id) {
            Ok(seasons) => seasons,
            Err(e) => return Ok(Self::catalog_unavailable(library_id, &e)),
        };

        let watched: BTreeSet<u32> = items.iter().filter_map(Item::watched_season).collect();
        let known: BTreeSet<u32> = seasons.into_iter().collect();

        if !self.config.season_gate.is_open(&watched, &known) {
            tracing::info!(
                "Not all seasons have been watched in library {library_id} ({} of {}). Skipping backup.",
                watched.len(),
                known.len()
            );
            return Ok(RunReport::ended(
                library_id,
                RunOutcome::SeasonsIncomplete {
                    watched: watched.len(),
                    total: known.len(),
                },
            ));
        }

        let mut report = RunReport::new(library_id);
        self.relocate_items(library_id, &items, MoveUnit::File, &mut report)?;
        Self::log_report(&report);
        Ok(report)
    }

    fn relocate_items(
        &self,
        library_id: &str,
        items: &[Item],
        unit: MoveUnit,
        report: &mut RunReport,
    ) -> Result<()> {
        let destination_dir = self.config.backup_folder_path.join(library_id);
        let mut moved_folders: HashSet<PathBuf> = HashSet::new();

        for item in items {
            self.wait_while_paused();

            if !self.formats.is_supported(&item.path) {
                tracing::info!(
                    "Skipping file '{}' as it is not in a supported format",
                    item.path
                );
                report.skipped += 1;
                continue;
            }

            self.ensure_directory(&destination_dir)?;

            let source_file = self.resolver.resolve(&item.path);
            let file_name = source_file.file_name().ok_or_else(|| AppError::MoveFailed {
                from: source_file.clone(),
                to: destination_dir.clone(),
                reason: "item path has no file name".to_string(),
            })?;

            let destination_file = destination_dir.join(file_name);
            if destination_file.exists() {
                tracing::info!(
                    "File already exists in the destination folder: {}",
                    destination_file.display()
                );
                report.outcome = RunOutcome::AlreadyBackedUp {
                    destination: destination_file,
                };
                return Ok(());
            }

            let (source, destination) = match unit {
                MoveUnit::File => (source_file, destination_file),
                MoveUnit::ContainingFolder => {
                    let Some(folder) =
                        containing_folder(&source_file, self.resolver.media_root())
                    else {
                        tracing::warn!(
                            "Skipping '{}': the movie has no folder of its own under {}",
                            item.path,
                            self.resolver.media_root().display()
                        );
                        report.skipped += 1;
                        continue;
                    };
                    let destination = destination_dir.join(folder.file_name().unwrap_or_default());

                    // Another watched item of this folder already took it along
                    if moved_folders.contains(&folder) {
                        tracing::info!(
                            "{} was moved with {}",
                            item.path,
                            destination.display()
                        );
                        self.remove_from_library(item)?;
                        report.relocated.push(item.id.clone());
                        continue;
                    }

                    let backed_up = destination.join(file_name);
                    if backed_up.exists() {
                        tracing::info!(
                            "File already exists in the destination folder: {}",
                            backed_up.display()
                        );
                        report.outcome = RunOutcome::AlreadyBackedUp {
                            destination: backed_up,
                        };
                        return Ok(());
                    }

                    (folder, destination)
                }
            };

            self.mover
                .move_path(&source, &destination)
                .map_err(|e| {
                    tracing::error!("Error moving {}: {e}", source.display());
                    AppError::MoveFailed {
                        from: source.clone(),
                        to: destination.clone(),
                        reason: e.to_string(),
                    }
                })?;

            if unit == MoveUnit::ContainingFolder {
                moved_folders.insert(source);
            }

            self.remove_from_library(item)?;
            report.relocated.push(item.id.clone());
        }

        Ok(())
    }

    fn wait_while_paused(&self) {
        while self.pause.is_paused() {
            tracing::info!(
                "Backup process is paused. Re-checking in {}s...",
                self.pause_interval.as_secs()
            );
            (self.sleep)(self.pause_interval);
        }
    }

    fn ensure_directory(&self, dir: &Path) -> Result<()> {
        if dir.exists() {
            return Ok(());
        }

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would create directory: {}", dir.display());
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|source| {
            tracing::error!("Error creating destination folder {}: {source}", dir.display());
            AppError::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            }
        })
    }

    fn remove_from_library(&self, item: &Item) -> Result<()> {
        if self.dry_run {
            tracing::info!("[DRY-RUN] Would remove item {} from the library", item.id);
            return Ok(());
        }

        self.catalog.delete_item(&item.id).inspect_err(|e| {
            tracing::error!("Error removing item {} from library: {e}", item.id);
        })?;
        tracing::info!("Removed item {} ({}) from the library", item.id, item.path);
        Ok(())
    }

    fn catalog_unavailable(library_id: &str, error: &crate::error::FetchError) -> RunReport {
        tracing::error!("Error fetching data for library {library_id}: {error}");
        RunReport::ended(
            library_id,
            RunOutcome::CatalogUnavailable {
                reason: error.to_string(),
            },
        )
    }

    fn log_report(report: &RunReport) {
        tracing::info!(
            "Library {}: {} item(s) relocated, {} skipped ({:?})",
            report.library_id,
            report.relocated.len(),
            report.skipped,
            report.outcome
        );
    }
}

/// Folder holding a movie file, if the movie has one of its own.
///
/// A file lying directly in the media root (or above it) shares its parent
/// with other titles, so there is no folder to move.
fn containing_folder(file: &Path, media_root: &Path) -> Option<PathBuf> {
    let parent = file.parent()?;
    parent.file_name()?;
    if media_root.starts_with(parent) {
        return None;
    }
    Some(parent.to_path_buf())
}
