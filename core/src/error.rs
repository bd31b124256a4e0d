//! Error types for servebench-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::traits::ExecuteError;

/// Run-level error
#[derive(Error, Debug)]
pub enum BenchError {
    /// Invalid run configuration, reported before any request is issued
    #[error("configuration error: {0}")]
    Config(String),

    /// Metrics store violation
    #[error("metrics store error: {0}")]
    Store(#[from] StoreError),

    /// A single request failed (sequential mode aborts on the first one)
    #[error("request {request_id} failed: {source}")]
    Request {
        /// Slot of the failed request
        request_id: u64,
        /// Underlying failure
        #[source]
        source: ExecuteError,
    },

    /// One or more concurrently launched requests failed
    #[error("{failed} of {total} requests failed; first failure: {first}")]
    ExecutionFailed {
        /// Number of failed executions
        failed: usize,
        /// Number of launched executions
        total: usize,
        /// Rendered first failure
        first: String,
    },

    /// A spawned execution panicked or was aborted
    #[error("dispatch task failed: {0}")]
    Join(String),

    /// Concurrency gate closed while a request was waiting for a permit
    #[error("dispatcher shut down")]
    Shutdown,
}

impl BenchError {
    /// Configuration error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        BenchError::Config(message.into())
    }

    /// A required builder field was never set
    pub fn missing_config(field: &str) -> Self {
        Self::config(format!("missing required field: {field}"))
    }

    /// Per-request failure
    pub fn request(request_id: u64, source: ExecuteError) -> Self {
        BenchError::Request { request_id, source }
    }

    /// The concurrency gate was closed
    pub fn shutdown() -> Self {
        BenchError::Shutdown
    }
}

impl From<ConfigError> for BenchError {
    fn from(err: ConfigError) -> Self {
        BenchError::config(err.to_string())
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = BenchError::config("request rate must be positive");
        assert_eq!(
            err.to_string(),
            "configuration error: request rate must be positive"
        );
    }

    #[test]
    fn test_missing_config_names_field() {
        let err = BenchError::missing_config("executor");
        assert!(err.to_string().contains("executor"));
    }

    #[test]
    fn test_from_config_error() {
        let err: BenchError = ConfigError::InvalidRate("must be positive".into()).into();
        assert!(matches!(err, BenchError::Config(_)));
    }

    #[test]
    fn test_execution_failed_message() {
        let err = BenchError::ExecutionFailed {
            failed: 2,
            total: 10,
            first: "decode error".into(),
        };
        assert_eq!(
            err.to_string(),
            "2 of 10 requests failed; first failure: decode error"
        );
    }
}
