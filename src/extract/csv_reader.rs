use super::{coerce_measure, RecordExtractor};
use crate::constants::{FIELD_HEIGHT, FIELD_NAME, FIELD_WEIGHT};
use crate::errors::{AppError, AppResult};
use crate::models::{Dataset, Record, SourceFormat};
use polars::prelude::*;
use std::path::Path;

/// Reads delimited files whose header names `name`, `height` and `weight`.
///
/// Extra columns are ignored. Every column is read as text and coerced here,
/// so numeric inference in the CSV reader never decides what a valid value is.
pub struct CsvExtractor;

impl RecordExtractor for CsvExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn extract(&self, path: &Path) -> AppResult<Dataset> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| AppError::format(path, format!("Failed to read CSV: {e}")))?;

        let names = text_column(&df, FIELD_NAME, path)?;
        let heights = text_column(&df, FIELD_HEIGHT, path)?;
        let weights = text_column(&df, FIELD_WEIGHT, path)?;

        let mut records = Vec::with_capacity(df.height());
        for (idx, ((name, height), weight)) in names
            .into_iter()
            .zip(heights)
            .zip(weights)
            .enumerate()
        {
            // Header is line 1
            let line = idx + 2;
            let name = require(name, FIELD_NAME, line, path)?;
            let height = require(height, FIELD_HEIGHT, line, path)?;
            let weight = require(weight, FIELD_WEIGHT, line, path)?;

            let height = coerce_measure(&height, FIELD_HEIGHT, &name)?;
            let weight = coerce_measure(&weight, FIELD_WEIGHT, &name)?;
            records.push(Record::new(name, height, weight));
        }

        Ok(Dataset::from(records))
    }
}

fn text_column(df: &DataFrame, column: &str, path: &Path) -> AppResult<Vec<Option<String>>> {
    let series = df
        .column(column)
        .map_err(|_| AppError::format(path, format!("Header is missing column '{column}'")))?
        .cast(&DataType::String)
        .map_err(|e| AppError::format(path, format!("Column '{column}' is not text: {e}")))?;
    let values = series
        .str()
        .map_err(|e| AppError::format(path, format!("Column '{column}' is not text: {e}")))?;
    Ok(values
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}

/// Empty cells count as missing, whether the reader yields them as null or "".
fn require(value: Option<String>, column: &str, line: usize, path: &Path) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::format(path, format!("Line {line} has no value for '{column}'")))
}
