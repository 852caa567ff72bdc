//! anthro-etl library
//!
//! This crate provides the core functionality for the `anthro-etl` binary.
//! The crate root only declares modules; implementation and tests live in them.
//!
//! ## Overview
//!
//! The library is organized into modules that handle the stages of one batch run:
//!
//! - [`downloader`] - Fetches the source ZIP archive
//! - [`archive`] - Unpacks the archive into the input directory
//! - [`extract`] - Discovers source files and reads CSV, JSON-lines and XML records
//! - [`transform`] - Merges per-file datasets and converts units to meters/kilograms
//! - [`sinks`] - Publishes the dataset to a CSV file, an object store and a SQLite table
//! - [`pipeline`] - Sequences extraction, transformation and publishing
//! - [`progress`] - Milestone events and the append-only progress log
//! - [`cli`] - Command-line interface and the end-to-end workflow
//! - [`config`] - Pipeline configuration and TOML loading
//! - [`models`] - Records, datasets and source file classification
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! Running the core over a directory of already-unpacked source files:
//!
//! ```no_run
//! use anthro_etl::pipeline::Pipeline;
//! use anthro_etl::progress::{ProgressReporter, TracingProgress};
//! use anthro_etl::sinks::CsvFileSink;
//! use std::path::Path;
//!
//! # fn example() -> anthro_etl::errors::AppResult<()> {
//! let pipeline = Pipeline::new(ProgressReporter::new().with(TracingProgress))
//!     .with_sink(CsvFileSink::new("transformed_data.csv"));
//! let dataset = pipeline.run(Path::new("data/extracted"))?;
//! println!("{} records published", dataset.len());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod sinks;
pub mod transform;
pub mod utils;
