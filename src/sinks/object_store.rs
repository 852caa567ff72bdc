use super::{render_csv, DatasetSink, StagedFile, StagedOutput};
use crate::errors::{AppError, AppResult};
use crate::models::Dataset;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Bucket/key addressed blob store backed by a directory tree.
///
/// An object `key` in `bucket` lives at `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the on-disk location of an object.
    ///
    /// Bucket and key must be relative paths without `..` components.
    pub fn object_path(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        for part in [bucket, key] {
            let path = Path::new(part);
            let safe = !part.is_empty()
                && path
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !safe {
                return Err(AppError::SinkError(format!(
                    "Invalid object location '{bucket}/{key}'"
                )));
            }
        }
        Ok(self.root.join(bucket).join(key))
    }

    /// Stores `bytes` under `bucket/key`, replacing any existing object.
    pub fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let staged = self.stage_put(bucket, key, bytes)?;
        Box::new(staged).commit()?;
        self.object_path(bucket, key)
    }

    /// Writes `bytes` for `bucket/key` without replacing the current object.
    pub(crate) fn stage_put(&self, bucket: &str, key: &str, bytes: &[u8]) -> AppResult<StagedFile> {
        let object_path = self.object_path(bucket, key)?;
        let staged = StagedFile::write(&object_path, bytes)?;

        debug!(
            bucket = bucket,
            key = key,
            bytes = bytes.len(),
            "Object staged"
        );
        Ok(staged)
    }
}

/// Uploads the dataset as a CSV object.
pub struct ObjectStoreSink {
    store: LocalObjectStore,
    bucket: String,
    key: String,
}

impl ObjectStoreSink {
    pub fn new(store: LocalObjectStore, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl DatasetSink for ObjectStoreSink {
    fn name(&self) -> String {
        format!("object store {}/{}", self.bucket, self.key)
    }

    fn stage(&self, dataset: &Dataset) -> AppResult<Box<dyn StagedOutput>> {
        let bytes = render_csv(dataset)?;
        let staged = self.store.stage_put(&self.bucket, &self.key, &bytes)?;
        info!(
            bucket = %self.bucket,
            key = %self.key,
            records = dataset.len(),
            "Dataset staged for upload"
        );
        Ok(Box::new(staged))
    }
}
