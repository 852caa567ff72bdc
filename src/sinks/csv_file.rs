use super::{render_csv, DatasetSink, StagedFile, StagedOutput};
use crate::errors::AppResult;
use crate::models::Dataset;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the dataset to a single CSV file.
///
/// The file is staged next to its destination as `<file>.part` and renamed
/// over it on commit.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSink for CsvFileSink {
    fn name(&self) -> String {
        format!("CSV file {}", self.path.display())
    }

    fn stage(&self, dataset: &Dataset) -> AppResult<Box<dyn StagedOutput>> {
        let bytes = render_csv(dataset)?;
        let staged = StagedFile::write(&self.path, &bytes)?;
        info!(
            output = %self.path.display(),
            records = dataset.len(),
            bytes = bytes.len(),
            "CSV output staged"
        );
        Ok(Box::new(staged))
    }
}
