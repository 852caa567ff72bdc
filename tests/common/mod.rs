//! Common test utilities for integration tests

use std::fs;
use std::io::Write;
use std::path::Path;

/// Helper function to create a test source file in a directory
#[allow(dead_code)]
pub fn create_test_file(path: &Path, content: &str) {
    let parent = path.parent().unwrap();
    fs::create_dir_all(parent).unwrap();
    fs::File::create(path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
}

/// Helper function to create a test ZIP file with specified files
#[allow(dead_code)]
pub fn create_test_zip(
    zip_path: &Path,
    files: &[(&str, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, content) in files {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Returns true when `a` and `b` agree to within floating point noise
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Two people in CSV form
#[allow(dead_code)]
pub const SAMPLE_CSV: &str = "name,height,weight\nAlice,68,150\nBob,72,180\n";

/// One person as a JSON line
#[allow(dead_code)]
pub const SAMPLE_JSON: &str = r#"{"name":"Carol","height":"60","weight":"120"}
"#;

/// One person in XML form
#[allow(dead_code)]
pub const SAMPLE_XML: &str = r#"<?xml version="1.0"?>
<data>
  <person>
    <name>Dave</name>
    <height>70</height>
    <weight>160</weight>
  </person>
</data>"#;

/// Two people, both missing their weight
#[allow(dead_code)]
pub const XML_MISSING_WEIGHT: &str = r#"<?xml version="1.0"?>
<data>
  <person><name>Erin</name><height>63</height></person>
  <person><name>Frank</name><height>69</height></person>
</data>"#;
