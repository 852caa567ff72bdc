//! Dataset-level stages that run after extraction.

mod merge;
mod normalize;

pub use merge::merge_datasets;
pub use normalize::normalize_units;
