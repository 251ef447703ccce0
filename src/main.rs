use anyhow::{Context, bail};
use chrono::Local;
use clap::Parser;
use jellyvault::{
    ArchiverConfig, BackupLockGuard, Catalog, Cli, Commands, DryRunMover, JellyfinClient, KindArg,
    Library, LibraryKind, Mover, NativeMover, Relocator, RunOutcome, RunReport, Scheduler,
};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let result = match cli.command {
        Commands::Daemon { config, dry_run } => run_daemon(&config, dry_run),
        Commands::Run {
            config,
            dry_run,
            library,
            kind,
        } => run_once(&config, dry_run, &library, kind),
        Commands::Libraries { config } => list_libraries(&config),
    };

    if let Err(e) = result {
        tracing::error!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<ArchiverConfig> {
    tracing::info!("Loading configuration from: {}", config_path.display());

    let config = ArchiverConfig::from_file(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    config.validate()?;
    Ok(config)
}

fn mover_for(dry_run: bool) -> Box<dyn Mover> {
    if dry_run {
        tracing::info!("Dry-run mode: using DryRunMover");
        Box::new(DryRunMover)
    } else {
        Box::new(NativeMover)
    }
}

fn lock_backup_root(config: &ArchiverConfig, dry_run: bool) -> anyhow::Result<Option<BackupLockGuard>> {
    if dry_run {
        return Ok(None);
    }

    let guard = BackupLockGuard::try_lock(&config.backup_folder_path)?;
    tracing::info!("Acquired backup lock: {}", guard.lock_path().display());
    Ok(Some(guard))
}

fn run_once(
    config_path: &Path,
    dry_run: bool,
    library_id: &str,
    kind: Option<KindArg>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let client = JellyfinClient::from_config(&config)?;
    let _lock = lock_backup_root(&config, dry_run)?;

    let library = match kind {
        Some(KindArg::Movie) => Library::new(library_id, LibraryKind::Movie),
        Some(KindArg::Series) => Library::new(library_id, LibraryKind::Series),
        None => {
            let libraries = client.list_libraries()?;
            match libraries.into_iter().find(|l| l.id == library_id) {
                Some(library) => library,
                None => bail!("library '{library_id}' not found on the server"),
            }
        }
    };

    let mover = mover_for(dry_run);
    let report = Relocator::new(&config, &client, mover.as_ref())
        .with_dry_run(dry_run)
        .relocate(&library)?;

    print_report(&report, dry_run);
    Ok(())
}

fn run_daemon(config_path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let client = JellyfinClient::from_config(&config)?;
    client.health_check()?;
    let _lock = lock_backup_root(&config, dry_run)?;

    let libraries = client.list_libraries()?;
    let mut scheduler = Scheduler::for_libraries(&libraries, &config, Local::now().naive_local());

    if scheduler.is_empty() {
        tracing::warn!("No movie or series libraries to schedule");
    }

    // First Ctrl+C stops after the running job, a second one exits at once
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if r.swap(false, Ordering::SeqCst) {
            tracing::info!("Received interrupt signal, shutting down gracefully...");
        } else {
            tracing::warn!("Received second interrupt signal, exiting now");
            process::exit(130);
        }
    }) {
        tracing::warn!("Failed to set Ctrl-C handler: {}", e);
    }

    tracing::info!("Backup daemon is running. Press Ctrl+C to exit.");
    if let Some(next) = scheduler.next_run() {
        tracing::info!("Next run at {next}");
    }

    while running.load(Ordering::SeqCst) {
        let ran = scheduler.run_pending(Local::now().naive_local(), |library| {
            run_job(config_path, &config, &client, dry_run, library);
        });

        if ran > 0 {
            if let Some(next) = scheduler.next_run() {
                tracing::info!("Next run at {next}");
            }
        }

        std::thread::sleep(Duration::from_secs(1));
    }

    tracing::info!("Daemon stopped gracefully");
    Ok(())
}

/// One scheduled relocation. Errors are logged and never stop the daemon.
fn run_job(
    config_path: &Path,
    startup_config: &ArchiverConfig,
    client: &JellyfinClient,
    dry_run: bool,
    library: &Library,
) {
    // Re-read so pause and format changes apply without a restart
    let config = match ArchiverConfig::from_file(config_path) {
        Ok(config) => config.reloaded(startup_config),
        Err(e) => {
            tracing::warn!("Could not reload configuration, using startup settings: {e}");
            startup_config.clone()
        }
    };

    let mover = mover_for(dry_run);
    match Relocator::new(&config, client, mover.as_ref())
        .with_dry_run(dry_run)
        .relocate(library)
    {
        Ok(report) => tracing::info!(
            "Library '{}' finished: {:?}",
            report.library_id,
            report.outcome
        ),
        Err(e) => tracing::error!("Relocation of library '{}' failed: {e}", library.id),
    }
}

fn list_libraries(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let client = JellyfinClient::from_config(&config)?;
    client.health_check()?;

    let libraries = client.list_libraries()?;

    println!("\n=== Libraries ===");
    for library in &libraries {
        let schedule = if config.is_excluded(&library.id) {
            "excluded".to_string()
        } else {
            match library.kind {
                LibraryKind::Movie => format!("daily at {}", config.schedule.movies.format("%H:%M")),
                LibraryKind::Series => format!("daily at {}", config.schedule.series.format("%H:%M")),
                LibraryKind::Other => "not scheduled".to_string(),
            }
        };
        println!(
            "  {} [{}] {} - {}",
            library.id, library.kind, library.name, schedule
        );
    }

    if libraries.is_empty() {
        println!("  (none)");
    }

    Ok(())
}

fn print_report(report: &RunReport, dry_run: bool) {
    if dry_run {
        println!("\n[DRY-RUN MODE] No files were moved and nothing was deleted");
    }

    println!("\nRelocation of library {} complete:", report.library_id);
    println!("  Items relocated: {}", report.relocated.len());
    println!("  Items skipped: {}", report.skipped);

    match &report.outcome {
        RunOutcome::Completed => println!("  All watched items processed"),
        RunOutcome::SeasonsIncomplete { watched, total } => {
            println!("  Not all seasons watched ({watched} of {total}), nothing moved");
        }
        RunOutcome::AlreadyBackedUp { destination } => {
            println!("  Stopped: {} is already backed up", destination.display());
        }
        RunOutcome::CatalogUnavailable { reason } => {
            println!("  Catalog unavailable, nothing moved: {reason}");
        }
        RunOutcome::UnsupportedLibrary => println!("  Library type is not relocated"),
    }
}
