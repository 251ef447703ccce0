// Copy-based relocation used when a rename would cross filesystems

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Calculate XXH3-128 checksum of a file using streaming for memory efficiency
pub fn calculate_checksum_native(path: &Path) -> io::Result<String> {
    const BUFFER_SIZE: usize = 1024 * 1024;

    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = xxhash_rust::xxh3::Xxh3Builder::new().build();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:032x}", hasher.digest128()))
}

/// Sibling path used while a copy is in flight
fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

fn copy_file_verified(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;

    let source_checksum = calculate_checksum_native(source)?;
    let dest_checksum = calculate_checksum_native(destination)?;

    if source_checksum != dest_checksum {
        return Err(io::Error::other(format!(
            "Checksum mismatch after copy of {}: source={source_checksum}, dest={dest_checksum}",
            source.display()
        )));
    }

    tracing::debug!(
        "Copied {} -> {} (checksum: {})",
        source.display(),
        destination.display(),
        source_checksum
    );
    Ok(())
}

fn copy_tree_verified(source: &Path, destination: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file_verified(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copy `source` (file or directory tree) to `destination`, verify every file
/// by checksum, then remove the source.
///
/// The copy lands under a `.partial` name and is renamed into place only after
/// verification, so the destination never holds a half-written tree.
pub(crate) fn relocate_by_copy(source: &Path, destination: &Path) -> io::Result<()> {
    let staging = staging_path(destination);
    let is_dir = fs::symlink_metadata(source)?.is_dir();

    let copied = if is_dir {
        copy_tree_verified(source, &staging)
    } else {
        copy_file_verified(source, &staging)
    };

    if let Err(e) = copied {
        let cleanup = if is_dir {
            fs::remove_dir_all(&staging)
        } else {
            fs::remove_file(&staging)
        };
        if let Err(cleanup_err) = cleanup {
            tracing::debug!("Could not remove {}: {}", staging.display(), cleanup_err);
        }
        return Err(e);
    }

    fs::rename(&staging, destination)?;

    if is_dir {
        fs::remove_dir_all(source)?;
    } else {
        fs::remove_file(source)?;
    }

    Ok(())
}
