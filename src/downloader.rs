//! Fetches the source archive over HTTP(S).

use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Where the archive for a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFetch {
    /// Fetched during this run.
    Downloaded { path: PathBuf, bytes: u64 },
    /// Already on disk from an earlier run; nothing was fetched.
    Reused(PathBuf),
}

impl ArchiveFetch {
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded { path, .. } | Self::Reused(path) => path,
        }
    }
}

/// Downloads `url` to `dest`.
///
/// # Behavior
///
/// - **Atomic downloads**: the body is streamed into `<dest>.part` and renamed
///   to `dest` once complete, so an interrupted run never leaves a truncated
///   archive behind.
/// - **Skip existing**: if `dest` already exists nothing is fetched.
/// - **No retries**: the first failure is returned.
///
/// # Errors
///
/// Returns `InvalidInput` for an unparsable URL, `DownloadError` when the
/// request fails or the server answers with a non-success status, and
/// `IoError` when the file cannot be written.
pub async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> AppResult<ArchiveFetch> {
    let url = Url::parse(url)?;

    if dest.exists() {
        info!(
            archive = %dest.display(),
            "Archive already present, skipping download"
        );
        return Ok(ArchiveFetch::Reused(dest.to_path_buf()));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::IoError(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = part_path(dest);
    // Remove stale tmp file if present (best-effort)
    if tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path).await {
            warn!(
                file_path = %tmp_path.display(),
                error = %e,
                "Failed to remove stale temp file"
            );
        }
    }

    info!(url = %url, archive = %dest.display(), "Downloading archive");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| AppError::DownloadError(format!("Failed to download {url}: {e}")))?;

    let status = response.status();
    let mut response = response.error_for_status().map_err(|e| {
        AppError::DownloadError(format!(
            "HTTP {}: Failed to download {url}: {e}",
            status.as_u16()
        ))
    })?;

    let mut file = File::create(&tmp_path).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create temp file {}: {e}",
            tmp_path.display()
        ))
    })?;

    let mut total_bytes = 0u64;
    while let Some(chunk) = response.chunk().await? {
        total_bytes += chunk.len() as u64;
        file.write_all(&chunk).await.map_err(|e| {
            AppError::IoError(format!(
                "Failed to write to temp file {}: {e}",
                tmp_path.display()
            ))
        })?;
    }
    file.flush().await?;

    // Ensure the file is closed before renaming
    drop(file);

    fs::rename(&tmp_path, dest).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to rename temp file {} to {}: {e}",
            tmp_path.display(),
            dest.display()
        ))
    })?;

    debug!(archive = %dest.display(), bytes = total_bytes, "Archive saved");
    Ok(ArchiveFetch::Downloaded {
        path: dest.to_path_buf(),
        bytes: total_bytes,
    })
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("data/source.zip")),
            PathBuf::from("data/source.zip.part")
        );
    }

    #[tokio::test]
    async fn existing_archive_is_not_downloaded_again() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("source.zip");
        std::fs::write(&dest, b"cached").unwrap();

        let client = reqwest::Client::new();
        // Unroutable URL: reaching the network would fail the test
        let result = download_archive(&client, "http://127.0.0.1:9/source.zip", &dest).await;

        assert_eq!(result.unwrap(), ArchiveFetch::Reused(dest.clone()));
        assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let result =
            download_archive(&client, "not a url", &temp_dir.path().join("source.zip")).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn connection_failure_is_download_error() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("source.zip");
        let client = reqwest::Client::new();

        let result = download_archive(&client, "http://127.0.0.1:9/source.zip", &dest).await;

        assert!(matches!(result, Err(AppError::DownloadError(_))));
        assert!(!dest.exists());
    }
}
