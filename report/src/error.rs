//! Error types for servebench-report

use thiserror::Error;

/// Report writing errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// File could not be created or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type ReportResult<T> = std::result::Result<T, ReportError>;
