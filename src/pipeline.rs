//! Sequencing of the core stages.
//!
//! Discovery, extraction, merge, normalization and publishing run in that
//! fixed order. The dataset is passed from stage to stage by value; nothing is
//! accumulated in shared state. The first error aborts the run before any sink
//! commits, so a run either reaches every sink or none.

use crate::errors::AppResult;
use crate::extract::{discover_sources, extractor_for};
use crate::models::{Dataset, SourceFile};
use crate::progress::{PipelineEvent, ProgressReporter};
use crate::sinks::{DatasetSink, StagedOutput};
use crate::transform::{merge_datasets, normalize_units};
use std::path::Path;
use tracing::{debug, info};

/// Runs every source file through the extractor registered for its format.
///
/// Datasets are returned in the order of `sources`. A progress event is
/// reported after each file.
pub fn extract_sources(
    sources: &[SourceFile],
    reporter: &ProgressReporter,
) -> AppResult<Vec<Dataset>> {
    let mut datasets = Vec::with_capacity(sources.len());

    for source in sources {
        let extractor = extractor_for(source.format);
        debug!(
            file = %source.path.display(),
            format = %source.format,
            "Extracting records"
        );
        let dataset = extractor.extract(&source.path)?;
        reporter.report(PipelineEvent::FileExtracted {
            file: source.file_name(),
            records: dataset.len(),
        });
        datasets.push(dataset);
    }

    Ok(datasets)
}

/// Driver for one run over an input directory.
pub struct Pipeline {
    reporter: ProgressReporter,
    sinks: Vec<Box<dyn DatasetSink>>,
}

impl Pipeline {
    pub fn new(reporter: ProgressReporter) -> Self {
        Self {
            reporter,
            sinks: Vec::new(),
        }
    }

    /// Registers a sink. Sinks are published to in registration order.
    pub fn with_sink(mut self, sink: impl DatasetSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Discovers, extracts, merges and normalizes the files in `input_dir`.
    pub fn transform(&self, input_dir: &Path) -> AppResult<Dataset> {
        let sources = discover_sources(input_dir)?;
        info!(
            input_dir = %input_dir.display(),
            files = sources.len(),
            "Starting extraction"
        );

        let extracted = extract_sources(&sources, &self.reporter)?;
        let merged = merge_datasets(extracted);
        let normalized = normalize_units(merged)?;

        self.reporter.report(PipelineEvent::TransformCompleted {
            records: normalized.len(),
        });
        Ok(normalized)
    }

    /// Hands the dataset to every sink, once each.
    ///
    /// All sinks stage their output before any of them commits. If staging
    /// fails for one sink, the outputs already staged are discarded and no
    /// destination changes.
    pub fn publish(&self, dataset: &Dataset) -> AppResult<()> {
        let mut staged = Vec::with_capacity(self.sinks.len());
        for sink in &self.sinks {
            staged.push((sink.name(), sink.stage(dataset)?));
        }

        for (name, output) in staged {
            output.commit()?;
            self.reporter
                .report(PipelineEvent::DatasetPublished { sink: name });
        }
        Ok(())
    }

    /// Transforms `input_dir` and publishes the result.
    pub fn run(&self, input_dir: &Path) -> AppResult<Dataset> {
        let dataset = self.transform(input_dir)?;
        self.publish(&dataset)?;
        Ok(dataset)
    }
}
