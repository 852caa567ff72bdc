use crate::models::Dataset;

/// Concatenates per-file datasets into one, preserving input order.
///
/// Callers pass the datasets in processing order (all CSV files, then JSON,
/// then XML). Nothing is sorted, deduplicated or transformed.
pub fn merge_datasets<I>(datasets: I) -> Dataset
where
    I: IntoIterator<Item = Dataset>,
{
    datasets.into_iter().fold(Dataset::new(), Dataset::concat)
}
