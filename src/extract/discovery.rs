use crate::errors::{AppError, AppResult};
use crate::models::SourceFile;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Finds the source files directly inside `dir`, grouped by format.
///
/// Only regular files at the top level are considered; sub-directories are
/// not descended into. Files whose extension is not `csv`, `json` or `xml`
/// (case-insensitive) are ignored.
///
/// # Returns
///
/// All CSV files, then all JSON files, then all XML files. Within a group the
/// files are ordered by file name, so repeated runs over the same directory
/// process files in the same order.
///
/// # Errors
///
/// Returns `IoError` if the directory does not exist or cannot be listed.
pub fn discover_sources(dir: &Path) -> AppResult<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(AppError::IoError(format!(
            "Input directory does not exist: {}",
            dir.display()
        )));
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            AppError::IoError(format!("Failed to list {}: {e}", dir.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match SourceFile::classify(entry.into_path()) {
            Some(source) => sources.push(source),
            None => continue,
        }
    }

    // Stable sort keeps the file-name order inside each format group
    sources.sort_by_key(|source| source.format);

    debug!(
        dir = %dir.display(),
        files = sources.len(),
        "Discovered source files"
    );

    Ok(sources)
}
