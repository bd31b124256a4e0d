//! HTTP request executor
//!
//! One `HttpExecutor` serves a whole run: it owns the shared reqwest client,
//! the backend adapter selected at startup and the retry policy.
//!
//! A response body carrying an error indicator is retried with exponential
//! backoff until the policy gives up. Latency spans every attempt and every
//! backoff, from encoding the payload to reading the last body.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use servebench_core::{
    BackendAdapter, CodecError, ConfigError, ExecuteError, Executor, ResultRecord, RetryPolicy,
    SamplingParams, ScheduledRequest, WireRequest,
};
use thiserror::Error;

use crate::traits::{ConfigValidationError, EndpointConfig};

/// User agent sent with every request
pub const USER_AGENT: &str = "Benchmark Client";

/// Errors raised while constructing an executor.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint configuration is invalid
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] ConfigValidationError),

    /// Retry policy is invalid
    #[error(transparent)]
    Retry(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Executor that posts each request to the configured endpoint.
///
/// # Example
///
/// ```rust,ignore
/// let endpoint = EndpointConfig::new(Backend::Ksana).with_port(8080);
/// let executor = HttpExecutor::new(endpoint, RetryPolicy::default())?;
/// let record = executor.execute(&ScheduledRequest::new(0u64, "Hello")).await?;
/// ```
pub struct HttpExecutor {
    client: Client,
    endpoint: EndpointConfig,
    adapter: Box<dyn BackendAdapter>,
    params: SamplingParams,
    retry: RetryPolicy,
}

impl HttpExecutor {
    /// Create an executor for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint or retry policy is invalid, or the
    /// HTTP client cannot be built.
    pub fn new(endpoint: EndpointConfig, retry: RetryPolicy) -> Result<Self, ClientError> {
        endpoint.validate()?;
        retry.validate()?;

        let client = Client::builder()
            .timeout(endpoint.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            adapter: endpoint.backend.adapter(),
            endpoint,
            params: SamplingParams::greedy(),
            retry,
        })
    }

    /// Override the sampling parameters.
    pub fn with_sampling(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Get the endpoint configuration.
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn post(&self, wire: &WireRequest) -> Result<(StatusCode, Vec<u8>), ExecuteError> {
        let response = self
            .client
            .post(self.endpoint.url(wire.path))
            .json(&wire.body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok((status, bytes.to_vec()))
    }

    fn classify(&self, err: reqwest::Error) -> ExecuteError {
        if err.is_timeout() {
            ExecuteError::Timeout(self.endpoint.request_timeout)
        } else {
            ExecuteError::Http(err)
        }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    fn name(&self) -> &str {
        self.adapter.name()
    }

    async fn execute(&self, request: &ScheduledRequest) -> Result<ResultRecord, ExecuteError> {
        let start = Instant::now();
        let wire = self.adapter.encode(&request.prompt, &self.params)?;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let (status, bytes) = self.post(&wire).await?;
            let parsed = serde_json::from_slice::<Value>(&bytes);

            if let Some(message) = parsed
                .as_ref()
                .ok()
                .and_then(|body| self.adapter.error_indicator(body))
            {
                if attempt > self.retry.max_retries {
                    tracing::error!(
                        request_id = %request.id,
                        attempts = attempt,
                        error = %message,
                        "Backend error persisted, giving up"
                    );
                    return Err(ExecuteError::RetriesExhausted {
                        attempts: attempt,
                        message,
                    });
                }

                let backoff = self.retry.backoff(attempt);
                tracing::warn!(
                    request_id = %request.id,
                    attempt,
                    status = status.as_u16(),
                    backoff_ms = backoff.as_millis() as u64,
                    error = %message,
                    "Backend reported an error, retrying"
                );
                if backoff > Duration::ZERO {
                    tokio::time::sleep(backoff).await;
                }
                continue;
            }

            if !status.is_success() {
                return Err(ExecuteError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }

            let body = parsed.map_err(|e| CodecError::InvalidJson(e.to_string()))?;
            let generation = self.adapter.decode(&request.prompt, body)?;
            return Ok(ResultRecord::new(request, generation, start.elapsed()));
        }
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("backend", &self.adapter.name())
            .field("endpoint", &self.endpoint)
            .field("retry", &self.retry)
            .finish()
    }
}
