use crate::archive::unpack_archive;
use crate::cleanup::cleanup_workspace;
use crate::config::PipelineConfig;
use crate::downloader::{download_archive, ArchiveFetch};
use crate::errors::{AppError, AppResult};
use crate::pipeline::Pipeline;
use crate::progress::{FileProgressLog, PipelineEvent, ProgressReporter, TracingProgress};
use crate::sinks::{CsvFileSink, LocalObjectStore, ObjectStoreSink, SqliteTableSink};
use crate::utils::format_duration;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

fn build_command() -> Command<'static> {
    Command::new("anthro-etl")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("run")
                .about("Download, extract, normalize and publish the dataset")
                .after_help("Example:\n  anthro-etl run --input-dir data/people --table people")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .help("URL of the source ZIP archive")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("input_dir")
                        .short('i')
                        .long("input-dir")
                        .help("Read source files from this directory instead of downloading")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Path of the transformed CSV file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("database")
                        .short('d')
                        .long("database")
                        .help("SQLite database receiving the table")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("table")
                        .short('t')
                        .long("table")
                        .help("Table whose contents are replaced")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("cleanup")
                        .short('c')
                        .long("cleanup")
                        .help("Delete the archive and unpacked files after a successful run")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Applies `run` flags on top of the defaults.
fn config_from_run_args(sub: &ArgMatches) -> AppResult<PipelineConfig> {
    let mut config = PipelineConfig::default();
    if let Some(url) = sub.get_one::<String>("url") {
        config.source_url = url.clone();
    }
    if let Some(dir) = sub.get_one::<PathBuf>("input_dir") {
        config.input_dir = Some(dir.clone());
    }
    if let Some(output) = sub.get_one::<PathBuf>("output") {
        config.output_csv = output.clone();
    }
    if let Some(database) = sub.get_one::<PathBuf>("database") {
        config.database = database.clone();
    }
    if let Some(table) = sub.get_one::<String>("table") {
        config.table = table.clone();
    }
    if sub.get_flag("cleanup") {
        config.cleanup = true;
    }
    config.validate()?;
    Ok(config)
}

/// Parses command-line arguments and executes the selected subcommand.
///
/// - `run`: defaults overridden by flags
/// - `toml`: everything read from a configuration file
///
/// Both execute the same workflow:
/// 1. Download the source archive (skipped with an input directory)
/// 2. Unpack it
/// 3. Extract, merge and normalize the records
/// 4. Publish to the CSV file, the object store and the SQLite table
/// 5. Clean up if requested
///
/// # Errors
///
/// Returns the first error of any stage; nothing is published after a
/// failure.
pub fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => {
            let config = config_from_run_args(sub)?;
            run_workflow(&config)
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::InvalidInput("config path is required".into()))?;
            let config = PipelineConfig::from_toml_file(config_path)?;
            run_workflow(&config)
        }
        _ => cmd_for_help
            .print_help()
            .map_err(|e| AppError::IoError(format!("Failed to print help: {e}"))),
    }
}

/// Runs the whole job for `config`, reporting the outcome to the progress log.
pub fn run_workflow(config: &PipelineConfig) -> AppResult<()> {
    let reporter = ProgressReporter::new()
        .with(TracingProgress)
        .with(FileProgressLog::new(&config.progress_log));
    let pipeline = build_pipeline(config, reporter)?;

    let start = Instant::now();
    pipeline.reporter().report(PipelineEvent::RunStarted);

    match execute(config, &pipeline) {
        Ok(records) => {
            pipeline
                .reporter()
                .report(PipelineEvent::RunCompleted { records });
            info!(
                records = records,
                elapsed = format_duration(start.elapsed()),
                "All operations completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            pipeline.reporter().report(PipelineEvent::RunFailed {
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

fn build_pipeline(config: &PipelineConfig, reporter: ProgressReporter) -> AppResult<Pipeline> {
    Ok(Pipeline::new(reporter)
        .with_sink(CsvFileSink::new(&config.output_csv))
        .with_sink(ObjectStoreSink::new(
            LocalObjectStore::new(&config.object_store_dir),
            &config.bucket,
            &config.object_key,
        ))
        .with_sink(SqliteTableSink::new(&config.database, &config.table)?))
}

fn execute(config: &PipelineConfig, pipeline: &Pipeline) -> AppResult<usize> {
    let input_dir = match &config.input_dir {
        Some(dir) => dir.clone(),
        None => {
            fetch_sources(config, pipeline.reporter())?;
            config.extract_dir.clone()
        }
    };

    let dataset = pipeline.run(&input_dir)?;

    if config.cleanup && config.input_dir.is_none() {
        cleanup_workspace(&config.archive_path, &config.extract_dir);
    }

    Ok(dataset.len())
}

/// Downloads and unpacks the source archive.
fn fetch_sources(config: &PipelineConfig, reporter: &ProgressReporter) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| AppError::IoError(format!("Failed to start runtime: {e}")))?;
    let client = reqwest::Client::new();
    let fetch = rt.block_on(download_archive(
        &client,
        &config.source_url,
        &config.archive_path,
    ))?;
    reporter.report(archive_event(&fetch));

    let files = unpack_archive(fetch.path(), &config.extract_dir)?;
    reporter.report(PipelineEvent::ArchiveUnpacked {
        dir: config.extract_dir.clone(),
        files,
    });
    Ok(())
}

fn archive_event(fetch: &ArchiveFetch) -> PipelineEvent {
    match fetch {
        ArchiveFetch::Downloaded { path, bytes } => PipelineEvent::ArchiveDownloaded {
            path: path.clone(),
            bytes: *bytes,
        },
        ArchiveFetch::Reused(path) => PipelineEvent::ArchiveReused { path: path.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_matches(args: &[&str]) -> ArgMatches {
        let matches = build_command().try_get_matches_from(args).unwrap();
        matches.subcommand_matches("run").unwrap().clone()
    }

    #[test]
    fn run_without_flags_uses_defaults() {
        let sub = run_matches(&["anthro-etl", "run"]);
        let config = config_from_run_args(&sub).unwrap();
        assert_eq!(config.table, PipelineConfig::default().table);
        assert!(config.input_dir.is_none());
        assert!(!config.cleanup);
    }

    #[test]
    fn run_flags_override_defaults() {
        let sub = run_matches(&[
            "anthro-etl",
            "run",
            "--input-dir",
            "fixtures",
            "--table",
            "people",
            "-o",
            "out.csv",
            "--cleanup",
        ]);
        let config = config_from_run_args(&sub).unwrap();
        assert_eq!(config.input_dir, Some(PathBuf::from("fixtures")));
        assert_eq!(config.table, "people");
        assert_eq!(config.output_csv, PathBuf::from("out.csv"));
        assert!(config.cleanup);
    }

    #[test]
    fn run_rejects_invalid_table() {
        let sub = run_matches(&["anthro-etl", "run", "--table", "bad name"]);
        assert!(config_from_run_args(&sub).is_err());
    }

    #[test]
    fn cached_archive_is_not_reported_as_downloaded() {
        let cached = archive_event(&ArchiveFetch::Reused(PathBuf::from("data/source.zip")));
        assert!(matches!(cached, PipelineEvent::ArchiveReused { .. }));

        let fetched = archive_event(&ArchiveFetch::Downloaded {
            path: PathBuf::from("data/source.zip"),
            bytes: 42,
        });
        assert!(matches!(fetched, PipelineEvent::ArchiveDownloaded { bytes: 42, .. }));
    }

    #[test]
    fn toml_command_requires_path() {
        let err = build_command().try_get_matches_from(vec!["anthro-etl", "toml"]);
        assert!(err.is_err());
    }
}
