// Data source URL
pub const SOURCE_ARCHIVE_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-PY0221EN-SkillsNetwork/labs/module%206/Lab%20-%20Extract%20Transform%20Load/data/source.zip";

// Unit conversion factors (exact)
pub const METERS_PER_INCH: f64 = 0.0254;
pub const KILOGRAMS_PER_POUND: f64 = 0.453592;

// Record fields, in output column order
pub const FIELD_NAME: &str = "name";
pub const FIELD_HEIGHT: &str = "height";
pub const FIELD_WEIGHT: &str = "weight";

// XML element wrapping one record
pub const XML_RECORD_TAG: &[u8] = b"person";

// Source file extensions
pub const CSV_EXTENSION: &str = "csv";
pub const JSON_EXTENSION: &str = "json";
pub const XML_EXTENSION: &str = "xml";
