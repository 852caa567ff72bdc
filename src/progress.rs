//! Milestone reporting for a pipeline run.
//!
//! The driver emits a [`PipelineEvent`] after each stage. Observers turn those
//! events into log lines; they must never fail or block the run.

use chrono::Local;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A discrete milestone reached by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted,
    ArchiveDownloaded { path: PathBuf, bytes: u64 },
    ArchiveReused { path: PathBuf },
    ArchiveUnpacked { dir: PathBuf, files: usize },
    FileExtracted { file: String, records: usize },
    TransformCompleted { records: usize },
    DatasetPublished { sink: String },
    RunCompleted { records: usize },
    RunFailed { reason: String },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted => write!(f, "ETL process started."),
            Self::ArchiveDownloaded { path, bytes } => {
                write!(f, "Archive downloaded to {} ({bytes} bytes).", path.display())
            }
            Self::ArchiveReused { path } => {
                write!(f, "Using previously downloaded archive {}.", path.display())
            }
            Self::ArchiveUnpacked { dir, files } => {
                write!(f, "Unpacked {files} file(s) into {}.", dir.display())
            }
            Self::FileExtracted { file, records } => {
                write!(f, "Extracted {records} record(s) from {file}")
            }
            Self::TransformCompleted { records } => {
                write!(f, "Data transformation completed ({records} record(s)).")
            }
            Self::DatasetPublished { sink } => write!(f, "Dataset published to {sink}."),
            Self::RunCompleted { records } => {
                write!(f, "ETL process completed successfully ({records} record(s)).")
            }
            Self::RunFailed { reason } => write!(f, "ETL process failed: {reason}"),
        }
    }
}

/// Receives pipeline milestones.
pub trait ProgressObserver {
    fn notify(&self, event: &PipelineEvent);
}

/// Fans a milestone out to every registered observer.
#[derive(Default)]
pub struct ProgressReporter {
    observers: Vec<Box<dyn ProgressObserver>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn report(&self, event: PipelineEvent) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }
}

/// Mirrors milestones into the structured log.
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn notify(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunFailed { reason } => warn!(reason = %reason, "Pipeline failed"),
            other => info!(milestone = %other, "Pipeline progress"),
        }
    }
}

/// Appends `<timestamp>: <message>` lines to a progress log file.
///
/// The file is opened in append mode for every event and never truncated.
/// Write failures are logged as warnings and otherwise ignored.
pub struct FileProgressLog {
    path: PathBuf,
}

impl FileProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl ProgressObserver for FileProgressLog {
    fn notify(&self, event: &PipelineEvent) {
        let line = format!("{}: {event}", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"));
        if let Err(e) = self.append(&line) {
            warn!(
                log_file = %self.path.display(),
                error = %e,
                "Failed to write progress log"
            );
        }
    }
}
