use std::path::Path;
use tracing::{info, warn};

/// Deletes the downloaded archive and the unpacked directory after a run.
///
/// Missing paths are ignored. Individual deletion errors are logged as
/// warnings but never fail the run.
pub fn cleanup_workspace(archive: &Path, extract_dir: &Path) {
    let mut removed = 0;
    let mut errors = 0;

    if archive.is_file() {
        match std::fs::remove_file(archive) {
            Ok(_) => removed += 1,
            Err(e) => {
                errors += 1;
                warn!(
                    zip_file = %archive.display(),
                    error = %e,
                    "Failed to delete ZIP file"
                );
            }
        }
    }

    if extract_dir.is_dir() {
        match std::fs::remove_dir_all(extract_dir) {
            Ok(_) => removed += 1,
            Err(e) => {
                errors += 1;
                warn!(
                    extract_dir = %extract_dir.display(),
                    error = %e,
                    "Failed to delete extracted directory"
                );
            }
        }
    }

    info!(removed = removed, errors = errors, "Cleanup completed");
}
