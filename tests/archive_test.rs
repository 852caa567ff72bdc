//! Integration tests for archive unpacking and cleanup

#[path = "common/mod.rs"]
mod common;

use anthro_etl::archive::unpack_archive;
use anthro_etl::cleanup::cleanup_workspace;
use anthro_etl::errors::AppError;
use common::*;
use tempfile::TempDir;

#[test]
fn test_unpack_archive_basic() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(
        &zip_path,
        &[("source1.csv", SAMPLE_CSV), ("source1.json", SAMPLE_JSON)],
    )
    .unwrap();

    let dest = temp_dir.path().join("extracted");
    let written = unpack_archive(&zip_path, &dest).unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        std::fs::read_to_string(dest.join("source1.csv")).unwrap(),
        SAMPLE_CSV
    );
    assert!(dest.join("source1.json").exists());
}

#[test]
fn test_unpack_archive_nested_entries() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(&zip_path, &[("nested/inner.xml", SAMPLE_XML)]).unwrap();

    let dest = temp_dir.path().join("extracted");
    unpack_archive(&zip_path, &dest).unwrap();

    assert!(dest.join("nested/inner.xml").exists());
}

#[test]
fn test_unpack_archive_skips_existing_destination() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(&zip_path, &[("source1.csv", SAMPLE_CSV)]).unwrap();

    let dest = temp_dir.path().join("extracted");
    std::fs::create_dir_all(&dest).unwrap();

    assert_eq!(unpack_archive(&zip_path, &dest).unwrap(), 0);
    assert!(!dest.join("source1.csv").exists());
}

#[test]
fn test_unpack_archive_error_on_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    std::fs::write(&zip_path, "invalid").unwrap();

    let dest = temp_dir.path().join("extracted");
    let result = unpack_archive(&zip_path, &dest);

    match result.unwrap_err() {
        AppError::ArchiveError(msg) => assert!(msg.contains("Failed to read ZIP archive")),
        other => panic!("Expected ArchiveError, got {other:?}"),
    }
    assert!(!dest.exists());
}

#[test]
fn test_unpack_archive_corrupt_entry_leaves_no_destination() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(
        &zip_path,
        &[
            ("a.csv", SAMPLE_CSV),
            ("b.csv", "name,height,weight\nZed,70,170\n"),
        ],
    )
    .unwrap();

    // Entries are stored uncompressed, so flipping a data byte breaks the CRC
    let mut bytes = std::fs::read(&zip_path).unwrap();
    let offset = bytes.windows(3).position(|w| w == b"Zed").unwrap();
    bytes[offset + 1] = b'a';
    std::fs::write(&zip_path, bytes).unwrap();

    let dest = temp_dir.path().join("extracted");
    assert!(unpack_archive(&zip_path, &dest).is_err());
    assert!(!dest.exists());
    assert!(!temp_dir.path().join("extracted.part").exists());

    // A second attempt must fail again rather than reuse a partial directory
    assert!(unpack_archive(&zip_path, &dest).is_err());
    assert!(!dest.exists());
}

#[test]
fn test_unpack_archive_replaces_stale_staging_directory() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(&zip_path, &[("source1.csv", SAMPLE_CSV)]).unwrap();
    let staging = temp_dir.path().join("extracted.part");
    create_test_file(&staging.join("leftover.csv"), "name,height,weight\n");

    let dest = temp_dir.path().join("extracted");
    assert_eq!(unpack_archive(&zip_path, &dest).unwrap(), 1);

    assert!(dest.join("source1.csv").exists());
    assert!(!dest.join("leftover.csv").exists());
    assert!(!staging.exists());
}

#[test]
fn test_cleanup_after_unpack() {
    let temp_dir = TempDir::new().unwrap();
    let zip_path = temp_dir.path().join("source.zip");
    create_test_zip(&zip_path, &[("source1.csv", SAMPLE_CSV)]).unwrap();
    let dest = temp_dir.path().join("extracted");
    unpack_archive(&zip_path, &dest).unwrap();

    cleanup_workspace(&zip_path, &dest);

    assert!(!zip_path.exists());
    assert!(!dest.exists());
}
