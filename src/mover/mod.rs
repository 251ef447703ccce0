use std::fs;
use std::io;
use std::path::Path;

// Verified copy fallback for cross-filesystem moves
pub mod native;

/// Trait for moving media into the backup tree
pub trait Mover {
    /// Move a file or a whole directory from source to destination
    ///
    /// # Arguments
    /// * `source` - Full path to the source file or directory
    /// * `destination` - Full path the source should end up at
    ///
    /// # Errors
    /// Returns `io::Error` if the operation fails. An existing destination is
    /// never overwritten: the call fails with `ErrorKind::AlreadyExists`.
    fn move_path(&self, source: &Path, destination: &Path) -> io::Result<()>;
}

/// `DryRun` implementation - only logs operations without actual movement
pub struct DryRunMover;

impl Mover for DryRunMover {
    fn move_path(&self, source: &Path, destination: &Path) -> io::Result<()> {
        tracing::info!(
            "[DRY-RUN] Would move: {} -> {}",
            source.display(),
            destination.display()
        );
        Ok(())
    }
}

/// Moves with `rename(2)`, falling back to a checksum-verified copy when the
/// backup root lives on another filesystem
pub struct NativeMover;

impl Mover for NativeMover {
    fn move_path(&self, source: &Path, destination: &Path) -> io::Result<()> {
        if fs::symlink_metadata(source).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Source does not exist: {}", source.display()),
            ));
        }

        if fs::symlink_metadata(destination).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Destination already exists: {}", destination.display()),
            ));
        }

        match fs::rename(source, destination) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::info!(
                    "{} is on another filesystem, copying with verification",
                    destination.display()
                );
                native::relocate_by_copy(source, destination)?;
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            "Successfully moved: {} -> {}",
            source.display(),
            destination.display()
        );
        Ok(())
    }
}
