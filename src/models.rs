use crate::constants::*;
use std::fmt;
use std::path::{Path, PathBuf};

/// One person entry, independent of the format it was read from.
///
/// Height and weight carry whatever unit the dataset is currently in:
/// inches/pounds after extraction, meters/kilograms after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub height: f64,
    pub weight: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, height: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            height,
            weight,
        }
    }
}

/// Ordered sequence of records.
///
/// Order is insertion order; there is no key and no deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Appends `other` after the records of `self`, consuming both.
    pub fn concat(mut self, other: Dataset) -> Dataset {
        self.records.extend(other.records);
        self
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Serialization of a source file.
///
/// The derived ordering is the merge order: every CSV file comes before every
/// JSON file, which comes before every XML file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceFormat {
    Csv,
    Json,
    Xml,
}

impl SourceFormat {
    /// Returns a human-readable name for the format.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON lines",
            Self::Xml => "XML",
        }
    }

    /// Classifies a file extension (without the dot), ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let lower = extension.trim().to_ascii_lowercase();
        match lower.as_str() {
            CSV_EXTENSION => Some(Self::Csv),
            JSON_EXTENSION => Some(Self::Json),
            XML_EXTENSION => Some(Self::Xml),
            _ => None,
        }
    }

    /// Classifies a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A discovered input file together with its classified format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: SourceFormat,
}

impl SourceFile {
    /// Returns `None` when the extension is not one of the known formats.
    pub fn classify(path: PathBuf) -> Option<Self> {
        let format = SourceFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    /// File name for log messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
