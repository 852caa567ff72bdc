//! Destinations for the normalized dataset.
//!
//! Each sink is invoked exactly once per run, after normalization. Publishing
//! is two-phase: every sink first stages its output out of sight, and only
//! when all of them have staged successfully are the outputs committed.

mod csv_file;
mod object_store;
mod sql_table;

use crate::constants::{FIELD_HEIGHT, FIELD_NAME, FIELD_WEIGHT};
use crate::errors::{AppError, AppResult};
use crate::models::Dataset;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub use csv_file::CsvFileSink;
pub use object_store::{LocalObjectStore, ObjectStoreSink};
pub use sql_table::{validate_table_name, SqliteTableSink};

/// Consumes the final dataset.
pub trait DatasetSink {
    /// Human-readable destination, used in progress messages.
    fn name(&self) -> String;

    /// Writes the dataset without making it visible at the destination.
    fn stage(&self, dataset: &Dataset) -> AppResult<Box<dyn StagedOutput>>;

    /// Stages and immediately commits.
    fn publish(&self, dataset: &Dataset) -> AppResult<()> {
        self.stage(dataset)?.commit()
    }
}

/// Output written by [`DatasetSink::stage`] and waiting to be made visible.
///
/// Dropping it without calling `commit` discards the staged data.
pub trait StagedOutput {
    fn commit(self: Box<Self>) -> AppResult<()>;
}

/// A file written as `<dest>.part`, renamed over `dest` on commit.
pub(crate) struct StagedFile {
    tmp_path: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Writes `bytes` next to `dest`, creating parent directories.
    pub(crate) fn write(dest: &Path, bytes: &[u8]) -> AppResult<Self> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::SinkError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut tmp_name = dest.as_os_str().to_owned();
        tmp_name.push(".part");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, bytes).map_err(|e| {
            AppError::SinkError(format!(
                "Failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;

        Ok(Self {
            tmp_path,
            dest: dest.to_path_buf(),
            committed: false,
        })
    }
}

impl StagedOutput for StagedFile {
    fn commit(mut self: Box<Self>) -> AppResult<()> {
        fs::rename(&self.tmp_path, &self.dest).map_err(|e| {
            AppError::SinkError(format!(
                "Failed to rename temp file {} to {}: {e}",
                self.tmp_path.display(),
                self.dest.display()
            ))
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.tmp_path) {
            warn!(
                file_path = %self.tmp_path.display(),
                error = %e,
                "Failed to discard staged output"
            );
        }
    }
}

/// Converts a dataset into a `name,height,weight` DataFrame.
fn dataset_to_dataframe(dataset: &Dataset) -> AppResult<DataFrame> {
    let len = dataset.len();
    let mut names = Vec::with_capacity(len);
    let mut heights = Vec::with_capacity(len);
    let mut weights = Vec::with_capacity(len);

    for record in dataset {
        names.push(record.name.as_str());
        heights.push(record.height);
        weights.push(record.weight);
    }

    DataFrame::new(vec![
        Series::new(FIELD_NAME, names),
        Series::new(FIELD_HEIGHT, heights),
        Series::new(FIELD_WEIGHT, weights),
    ])
    .map_err(|e| AppError::SinkError(format!("Failed to create DataFrame: {e}")))
}

/// Renders a dataset as CSV bytes with a `name,height,weight` header.
pub(crate) fn render_csv(dataset: &Dataset) -> AppResult<Vec<u8>> {
    let mut df = dataset_to_dataframe(dataset)?;
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| AppError::SinkError(format!("Failed to write CSV: {e}")))?;
    Ok(buf)
}
