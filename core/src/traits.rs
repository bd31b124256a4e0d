//! Core traits for backend adapters, executors and prompt sources
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (vendors/, samplers/).

use crate::request::{ScheduledRequest, SamplingParams};
use crate::response::{Generation, ResultRecord};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

// ============================================================================
// Backend Adapter Trait
// ============================================================================

/// Backend-specific request payload
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// Endpoint path the payload is posted to
    pub path: &'static str,

    /// JSON body
    pub body: Value,
}

/// Pure translation between a prompt and one backend's wire schema
///
/// Adapters are stateless; one is selected per run from the backend identity.
pub trait BackendAdapter: Send + Sync {
    /// Backend identifier (e.g., "ksana", "trt-llm")
    fn name(&self) -> &'static str;

    /// Endpoint path suffix (e.g., "/generate")
    fn path(&self) -> &'static str;

    /// Build the request payload for `prompt`
    fn encode(&self, prompt: &str, params: &SamplingParams) -> Result<WireRequest, CodecError>;

    /// Normalize a successful response body
    ///
    /// `prompt` is the exact prompt that was sent, for backends that echo it.
    fn decode(&self, prompt: &str, body: Value) -> Result<Generation, CodecError>;

    /// Explicit error indicator carried by a response body, if any
    fn error_indicator(&self, body: &Value) -> Option<String> {
        body.get("error").map(|err| match err {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        })
    }
}

/// Adapter encode/decode errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Payload could not be serialized
    #[error("{backend}: failed to encode request: {reason}")]
    Encode {
        /// Backend identifier
        backend: &'static str,
        /// Serializer message
        reason: String,
    },

    /// Response body is not JSON
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    /// Response is JSON but lacks an expected field
    #[error("{backend}: malformed response: {reason}")]
    Malformed {
        /// Backend identifier
        backend: &'static str,
        /// Deserializer message (names the missing field)
        reason: String,
    },

    /// A list field that must hold at least one element is empty
    #[error("{backend}: field `{field}` is empty")]
    EmptyList {
        /// Backend identifier
        backend: &'static str,
        /// Field name
        field: &'static str,
    },
}

impl CodecError {
    /// Wrap a serde error raised while decoding `backend`'s response
    pub fn malformed(backend: &'static str, err: impl std::fmt::Display) -> Self {
        CodecError::Malformed {
            backend,
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// Executor Trait
// ============================================================================

/// Performs one request/response cycle and measures it
#[async_trait]
pub trait Executor: Send + Sync {
    /// Executor identifier, used in logs
    fn name(&self) -> &str;

    /// Execute `request` and return its measurement
    async fn execute(&self, request: &ScheduledRequest) -> Result<ResultRecord, ExecuteError>;
}

/// Per-request execution errors
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// HTTP/network error (connection refused, DNS, reset)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success status without an error indicator in the body
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Adapter could not encode the request or decode the response
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Backend kept reporting errors until the retry policy gave up
    #[error("Backend error persisted after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Last error indicator returned by the backend
        message: String,
    },
}

impl ExecuteError {
    /// Whether the failure came from the response shape
    pub fn is_decode_error(&self) -> bool {
        matches!(self, ExecuteError::Codec(_))
    }
}

// ============================================================================
// Prompt Source Trait
// ============================================================================

/// Ordered source of prompt strings
pub trait PromptSource: Send + Sync {
    /// Source name for identification
    fn name(&self) -> &str;

    /// Load every prompt, in order
    fn load(&self) -> Result<Vec<String>, SamplerError>;
}

/// Prompt source errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// Source yielded no prompts
    #[error("No prompts found in {0}")]
    Empty(String),

    /// Invalid prompt-count or source configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Delimited file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error (e.g., reading the input file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
