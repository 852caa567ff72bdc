use super::{coerce_measure, RecordExtractor};
use crate::constants::{FIELD_HEIGHT, FIELD_WEIGHT};
use crate::errors::{AppError, AppResult};
use crate::models::{Dataset, Record, SourceFormat};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Reads files holding one JSON object per line.
///
/// A malformed line aborts the whole file; no line is skipped except blank
/// ones.
pub struct JsonLinesExtractor;

/// Raw shape of one line. Unknown keys are ignored.
#[derive(Debug, Deserialize)]
struct JsonRow {
    name: String,
    height: Measure,
    weight: Measure,
}

/// Measurements show up both as JSON numbers and as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Measure {
    Number(f64),
    Text(String),
}

impl Measure {
    fn resolve(&self, field: &str, record: &str) -> AppResult<f64> {
        match self {
            Measure::Number(value) => coerce_measure(&value.to_string(), field, record),
            Measure::Text(text) => coerce_measure(text, field, record),
        }
    }
}

impl RecordExtractor for JsonLinesExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn extract(&self, path: &Path) -> AppResult<Dataset> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!("Failed to read JSON file {}: {e}", path.display()))
        })?;
        parse_json_lines(&content, path)
    }
}

fn parse_json_lines(content: &str, path: &Path) -> AppResult<Dataset> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: JsonRow = serde_json::from_str(line)
            .map_err(|e| AppError::format(path, format!("Line {}: {e}", idx + 1)))?;

        let height = row.height.resolve(FIELD_HEIGHT, &row.name)?;
        let weight = row.weight.resolve(FIELD_WEIGHT, &row.name)?;
        records.push(Record::new(row.name, height, weight));
    }

    Ok(Dataset::from(records))
}
