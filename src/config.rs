use crate::constants::SOURCE_ARCHIVE_URL;
use crate::errors::{AppError, AppResult};
use crate::sinks::validate_table_name;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolved configuration with all values filled in.
///
/// Every field has a concrete default, so a TOML file only needs to list the
/// values it changes. Unknown keys are rejected to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// URL of the ZIP archive holding the source files
    pub source_url: String,
    /// Where the downloaded archive is stored
    pub archive_path: PathBuf,
    /// Directory the archive is unpacked into
    pub extract_dir: PathBuf,
    /// Read source files from this directory instead of downloading.
    /// When set, `source_url`, `archive_path` and `extract_dir` are unused.
    pub input_dir: Option<PathBuf>,
    /// Transformed CSV output
    pub output_csv: PathBuf,
    /// Append-only progress log
    pub progress_log: PathBuf,
    /// Root directory of the local object store
    pub object_store_dir: PathBuf,
    /// Bucket the transformed CSV is uploaded to
    pub bucket: String,
    /// Object key of the uploaded CSV
    pub object_key: String,
    /// SQLite database file
    pub database: PathBuf,
    /// Table whose contents are replaced by the dataset
    pub table: String,
    /// Whether to delete the archive and unpacked files after a successful run
    pub cleanup: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_ARCHIVE_URL.to_string(),
            archive_path: PathBuf::from("data/tmp/source.zip"),
            extract_dir: PathBuf::from("data/tmp/extracted"),
            input_dir: None,
            output_csv: PathBuf::from("data/output/transformed_data.csv"),
            progress_log: PathBuf::from("data/etl_log.txt"),
            object_store_dir: PathBuf::from("data/object_store"),
            bucket: "etl-bucket".to_string(),
            object_key: "Transformed_Data.csv".to_string(),
            database: PathBuf::from("data/etl.db"),
            table: "etl_table".to_string(),
            cleanup: false,
        }
    }
}

impl PipelineConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `InvalidInput` if the
    /// TOML is malformed, contains unknown keys, or fails [`validate`].
    ///
    /// [`validate`]: PipelineConfig::validate
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialization alone cannot.
    ///
    /// The source URL must parse (unless an input directory replaces the
    /// download), bucket and object key must be non-empty, and the table name
    /// must be a plain SQL identifier.
    pub fn validate(&self) -> AppResult<()> {
        if self.input_dir.is_none() {
            Url::parse(&self.source_url)?;
        }
        if self.bucket.trim().is_empty() {
            return Err(AppError::InvalidInput("Bucket must not be empty".into()));
        }
        if self.object_key.trim().is_empty() {
            return Err(AppError::InvalidInput("Object key must not be empty".into()));
        }
        validate_table_name(&self.table)
    }
}
