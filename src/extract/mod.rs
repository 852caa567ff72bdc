//! Record extraction from the three supported source formats.
//!
//! Each format has one [`RecordExtractor`] implementation. The driver never
//! branches on format itself: it asks [`extractor_for`] for the implementation
//! matching a [`SourceFormat`] and calls it.

mod csv_reader;
mod discovery;
mod json_lines;
mod xml_reader;

use crate::errors::{AppError, AppResult};
use crate::models::{Dataset, SourceFormat};
use std::path::Path;

pub use csv_reader::CsvExtractor;
pub use discovery::discover_sources;
pub use json_lines::JsonLinesExtractor;
pub use xml_reader::XmlExtractor;

/// Converts one source file into a [`Dataset`] in the file's native order.
///
/// Implementations are pure over their input file: they hold no state and keep
/// no reference to the path after returning.
pub trait RecordExtractor {
    fn format(&self) -> SourceFormat;

    fn extract(&self, path: &Path) -> AppResult<Dataset>;
}

/// Returns the extractor registered for `format`.
pub fn extractor_for(format: SourceFormat) -> &'static dyn RecordExtractor {
    match format {
        SourceFormat::Csv => &CsvExtractor,
        SourceFormat::Json => &JsonLinesExtractor,
        SourceFormat::Xml => &XmlExtractor,
    }
}

/// Parses a raw height/weight value into a finite number.
///
/// `record` identifies the record in the error message (usually its name or
/// position in the file).
pub(crate) fn coerce_measure(raw: &str, field: &str, record: &str) -> AppResult<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::ConversionError(format!(
            "{field} '{trimmed}' of record '{record}' is not a finite number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extractor_for_maps_every_format() {
        for format in [SourceFormat::Csv, SourceFormat::Json, SourceFormat::Xml] {
            assert_eq!(extractor_for(format).format(), format);
        }
    }

    #[test]
    fn coerce_measure_accepts_integers_and_decimals() {
        assert_eq!(coerce_measure("68", "height", "Alice").unwrap(), 68.0);
        assert_eq!(coerce_measure(" 150.5 ", "weight", "Alice").unwrap(), 150.5);
    }

    #[test]
    fn coerce_measure_rejects_text() {
        let err = coerce_measure("tall", "height", "Alice").unwrap_err();
        match err {
            AppError::ConversionError(msg) => {
                assert!(msg.contains("height"));
                assert!(msg.contains("tall"));
                assert!(msg.contains("Alice"));
            }
            other => panic!("Expected ConversionError, got {other:?}"),
        }
    }

    #[test]
    fn coerce_measure_rejects_empty_and_non_finite() {
        assert!(coerce_measure("", "weight", "Bob").is_err());
        assert!(coerce_measure("NaN", "weight", "Bob").is_err());
        assert!(coerce_measure("inf", "height", "Bob").is_err());
    }
}
