//! Unpacking of the downloaded ZIP archive.

use crate::errors::{AppError, AppResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Extracts every file of `zip_path` into `dest`.
///
/// Entries whose names would escape `dest` are skipped, as are directory
/// entries (directories are created when their files are written). If `dest`
/// already exists the archive is assumed to be unpacked and nothing is done.
///
/// Files are unpacked into `<dest>.part` and the directory is renamed to
/// `dest` only after every entry has been written. On failure the staging
/// directory is removed, so `dest` never holds a partial extraction.
///
/// # Returns
///
/// The number of files written.
///
/// # Errors
///
/// Returns `ArchiveError` if the archive cannot be opened or read and
/// `IoError` if a file cannot be written.
pub fn unpack_archive(zip_path: &Path, dest: &Path) -> AppResult<usize> {
    if dest.exists() {
        debug!(
            zip_file = %zip_path.display(),
            extract_dir = %dest.display(),
            "Skipping extraction, directory already exists"
        );
        return Ok(0);
    }

    let file = File::open(zip_path).map_err(|e| {
        AppError::ArchiveError(format!(
            "Failed to open ZIP file {}: {e}",
            zip_path.display()
        ))
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
        AppError::ArchiveError(format!(
            "Failed to read ZIP archive {}: {e}",
            zip_path.display()
        ))
    })?;

    // Entries land in `<dest>.part`; `dest` only appears once all are written
    let staging = staging_path(dest);
    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(|e| {
            AppError::IoError(format!(
                "Failed to remove stale staging directory {}: {e}",
                staging.display()
            ))
        })?;
    }

    let written = match extract_entries(&mut archive, zip_path, &staging) {
        Ok(written) => written,
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                warn!(
                    staging_dir = %staging.display(),
                    error = %cleanup,
                    "Failed to remove partial extraction"
                );
            }
            return Err(e);
        }
    };

    std::fs::rename(&staging, dest).map_err(|e| {
        AppError::IoError(format!(
            "Failed to move {} to {}: {e}",
            staging.display(),
            dest.display()
        ))
    })?;

    info!(
        zip_file = %zip_path.display(),
        extract_dir = %dest.display(),
        files = written,
        "Extraction completed"
    );

    Ok(written)
}

fn extract_entries(
    archive: &mut ZipArchive<File>,
    zip_path: &Path,
    dest: &Path,
) -> AppResult<usize> {
    std::fs::create_dir_all(dest).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create extraction directory {}: {e}",
            dest.display()
        ))
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            AppError::ArchiveError(format!(
                "Failed to read file {i} from ZIP {}: {e}",
                zip_path.display()
            ))
        })?;

        let out_path = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if entry.is_dir() {
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::IoError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut out_file = File::create(&out_path).map_err(|e| {
            AppError::IoError(format!(
                "Failed to create file {}: {e}",
                out_path.display()
            ))
        })?;

        std::io::copy(&mut entry, &mut out_file).map_err(|e| {
            AppError::IoError(format!(
                "Failed to copy file from ZIP {} to {}: {e}",
                zip_path.display(),
                out_path.display()
            ))
        })?;
        written += 1;
    }
    Ok(written)
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
