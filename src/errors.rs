use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Fetching the source archive failed
    #[error("Download error: {0}")]
    DownloadError(String),
    /// The source archive could not be read or unpacked
    #[error("Archive error: {0}")]
    ArchiveError(String),
    /// A source file does not match the layout expected for its format
    #[error("Format error in {file}: {reason}")]
    FormatError { file: String, reason: String },
    /// A height or weight value is not a finite number
    #[error("Conversion error: {0}")]
    ConversionError(String),
    /// Publishing the dataset to a sink failed
    #[error("Sink error: {0}")]
    SinkError(String),
    /// Invalid configuration or command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

impl AppError {
    /// Builds a [`AppError::FormatError`] for the given source file.
    pub fn format(file: &std::path::Path, reason: impl Into<String>) -> Self {
        AppError::FormatError {
            file: file.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::DownloadError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ArchiveError(err.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::SinkError(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::InvalidInput(format!("Failed to parse config: {err}"))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid URL: {err}"))
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
