//! Backend types and endpoint configuration
//!
//! This module provides the backend enumeration, adapter selection and the
//! endpoint configuration of a run.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use servebench_core::BackendAdapter;
use thiserror::Error;

use crate::adapters::{ChatServerAdapter, KsanaAdapter, TrtLlmAdapter, VllmAdapter};

/// Configuration validation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required configuration field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A timeout value is out of acceptable range.
    #[error("invalid timeout: {0:?}")]
    InvalidTimeout(Duration),

    /// Port zero cannot be connected to.
    #[error("invalid port: {0}")]
    InvalidPort(u16),
}

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Enumeration of supported serving backends.
///
/// Selected once at startup; [`Backend::adapter`] returns the matching
/// wire translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    /// KsanaLLM native `/generate`
    #[serde(rename = "ksana")]
    Ksana,
    /// TensorRT-LLM ensemble model via Triton
    #[serde(rename = "trt-llm")]
    TrtLlm,
    /// vLLM API server, output echoes the prompt
    #[serde(rename = "vllm")]
    Vllm,
    /// vLLM-compatible server that returns only the completion
    #[serde(rename = "evart")]
    Evart,
    /// KsanaLLM chat-style server
    #[serde(rename = "ksana-server")]
    KsanaServer,
    /// vLLM chat-style server, content echoes the prompt
    #[serde(rename = "vllm-server")]
    VllmServer,
}

impl Backend {
    /// Returns the identifier string for this backend.
    pub fn id(&self) -> &'static str {
        match self {
            Backend::Ksana => "ksana",
            Backend::TrtLlm => "trt-llm",
            Backend::Vllm => "vllm",
            Backend::Evart => "evart",
            Backend::KsanaServer => "ksana-server",
            Backend::VllmServer => "vllm-server",
        }
    }

    /// Returns the adapter that speaks this backend's wire schema.
    pub fn adapter(&self) -> Box<dyn BackendAdapter> {
        match self {
            Backend::Ksana => Box::new(KsanaAdapter),
            Backend::TrtLlm => Box::new(TrtLlmAdapter),
            Backend::Vllm => Box::new(VllmAdapter::echoing()),
            Backend::Evart => Box::new(VllmAdapter::evart()),
            Backend::KsanaServer => Box::new(ChatServerAdapter::ksana()),
            Backend::VllmServer => Box::new(ChatServerAdapter::vllm()),
        }
    }

    /// Returns all supported backends.
    pub fn all() -> &'static [Backend] {
        &[
            Backend::Ksana,
            Backend::TrtLlm,
            Backend::Vllm,
            Backend::Evart,
            Backend::KsanaServer,
            Backend::VllmServer,
        ]
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ksana" => Ok(Backend::Ksana),
            "trt-llm" | "trt_llm" | "trtllm" => Ok(Backend::TrtLlm),
            "vllm" => Ok(Backend::Vllm),
            "evart" => Ok(Backend::Evart),
            "ksana-server" | "ksana_server" => Ok(Backend::KsanaServer),
            "vllm-server" | "vllm_server" => Ok(Backend::VllmServer),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

// ============================================================================
// Endpoint Configuration
// ============================================================================

/// Where and how to reach the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Target backend
    pub backend: Backend,

    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Overall timeout of one HTTP exchange
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(3 * 3600)
}

impl EndpointConfig {
    /// Create an endpoint config with the default host, port and timeout.
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.host.is_empty() {
            return Err(ConfigValidationError::MissingField("host"));
        }
        if self.port == 0 {
            return Err(ConfigValidationError::InvalidPort(self.port));
        }

        // 1s to 24h
        if self.request_timeout < Duration::from_secs(1)
            || self.request_timeout > Duration::from_secs(24 * 3600)
        {
            return Err(ConfigValidationError::InvalidTimeout(self.request_timeout));
        }

        Ok(())
    }
}
