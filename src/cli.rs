use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Find default config path with priority:
/// 1. /etc/jellyvault/config.yaml (system-wide, preferred)
/// 2. ~/.config/jellyvault/config.yaml (user-specific)
/// 3. Fallback to /etc even if doesn't exist
pub fn default_config_path() -> PathBuf {
    let etc_path = PathBuf::from("/etc/jellyvault/config.yaml");

    if etc_path.exists() {
        return etc_path;
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join("jellyvault/config.yaml");
        if user_path.exists() {
            return user_path;
        }
    }

    // Fallback to /etc (will show clear error if missing)
    etc_path
}

#[derive(Parser)]
#[command(name = "jellyvault")]
#[command(version)]
#[command(about = "Moves fully watched Jellyfin media to backup storage", long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Library type for a one-off run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Series,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Schedule every library and relocate watched items daily
    Daemon {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Dry-run mode: log moves and deletes without performing them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Relocate watched items of one library now
    Run {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value_os_t = default_config_path())]
        config: PathBuf,

        /// Dry-run mode: log moves and deletes without performing them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Library id
        #[arg(short, long, value_name = "ID")]
        library: String,

        /// Library type; looked up on the server when omitted
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// List libraries and when each is processed
    Libraries {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE", default_value_os_t = default_config_path())]
        config: PathBuf,
    },
}
