use crate::constants::{KILOGRAMS_PER_POUND, METERS_PER_INCH};
use crate::errors::{AppError, AppResult};
use crate::models::{Dataset, Record};

/// Converts heights from inches to meters and weights from pounds to kilograms.
///
/// The conversion is elementwise and total: every record is converted, and a
/// single non-finite value fails the whole dataset with `ConversionError`.
///
/// This is not idempotent. The input must still be in inches and pounds;
/// calling it on an already normalized dataset scales the values again.
pub fn normalize_units(dataset: Dataset) -> AppResult<Dataset> {
    dataset
        .into_records()
        .into_iter()
        .map(convert_record)
        .collect::<AppResult<Vec<_>>>()
        .map(Dataset::from)
}

fn convert_record(record: Record) -> AppResult<Record> {
    let height = record.height * METERS_PER_INCH;
    let weight = record.weight * KILOGRAMS_PER_POUND;

    if !height.is_finite() || !weight.is_finite() {
        return Err(AppError::ConversionError(format!(
            "record '{}' has non-numeric measurements (height {}, weight {})",
            record.name, record.height, record.weight
        )));
    }

    Ok(Record {
        height,
        weight,
        ..record
    })
}
