//! Tests for config module

use anthro_etl::config::PipelineConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("etl.toml");

    let config_content = r#"
source_url = "https://example.com/people.zip"
archive_path = "custom/tmp/people.zip"
extract_dir = "custom/tmp/people"
output_csv = "custom/out/people.csv"
bucket = "people-bucket"
object_key = "exports/people.csv"
database = "custom/people.db"
table = "People"
cleanup = true
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = PipelineConfig::from_toml_file(&config_path).unwrap();

    assert_eq!(config.source_url, "https://example.com/people.zip");
    assert_eq!(config.archive_path, PathBuf::from("custom/tmp/people.zip"));
    assert_eq!(config.output_csv, PathBuf::from("custom/out/people.csv"));
    assert_eq!(config.bucket, "people-bucket");
    assert_eq!(config.object_key, "exports/people.csv");
    assert_eq!(config.table, "People");
    assert!(config.cleanup);
    // Not in the file, so the default applies
    assert_eq!(config.progress_log, PathBuf::from("data/etl_log.txt"));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("etl.toml");

    fs::write(&config_path, "table = \"people\"\n[paths\n").unwrap();

    assert!(PipelineConfig::from_toml_file(&config_path).is_err());
}

#[test]
fn test_config_nonexistent_file() {
    let result = PipelineConfig::from_toml_file(std::path::Path::new("nonexistent.toml"));
    assert!(result.is_err());
}
