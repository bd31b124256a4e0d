//! Run configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How requests are dispatched over the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Launch every request as soon as it is scheduled, join at the end
    #[default]
    Concurrent,
    /// One request in flight at a time
    Sequential,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Concurrent => write!(f, "concurrent"),
            DispatchMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// Request arrival rate (λ, requests per second)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestRate {
    /// Fire every request immediately
    #[default]
    Infinite,
    /// Poisson arrivals with the given mean rate
    PerSecond(f64),
}

impl RequestRate {
    /// Check that a finite rate is a positive number
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            RequestRate::Infinite => Ok(()),
            RequestRate::PerSecond(rps) if rps.is_nan() => {
                Err(ConfigError::InvalidRate("request rate is not a number".into()))
            }
            RequestRate::PerSecond(rps) if rps <= 0.0 => Err(ConfigError::InvalidRate(format!(
                "request rate must be positive, got {rps}"
            ))),
            RequestRate::PerSecond(_) => Ok(()),
        }
    }
}

impl fmt::Display for RequestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestRate::Infinite => write!(f, "inf"),
            RequestRate::PerSecond(rps) => write!(f, "{rps}"),
        }
    }
}

impl FromStr for RequestRate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "inf" | "+inf" | "infinity" => Ok(RequestRate::Infinite),
            _ => {
                let rps: f64 = trimmed.parse().map_err(|_| {
                    ConfigError::InvalidRate(format!("cannot parse request rate: {trimmed}"))
                })?;
                if rps.is_infinite() && rps > 0.0 {
                    Ok(RequestRate::Infinite)
                } else {
                    Ok(RequestRate::PerSecond(rps))
                }
            }
        }
    }
}

/// Dispatcher configuration for one benchmark run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Concurrency discipline
    pub mode: DispatchMode,

    /// Arrival rate of the schedule
    pub request_rate: RequestRate,

    /// Optional ceiling on simultaneously executing requests.
    ///
    /// Launch times still follow the arrival schedule; requests beyond the
    /// ceiling wait for a permit before their latency clock starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,

    /// Seed for the arrival schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Create a config for the given mode
    pub fn new(mode: DispatchMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the arrival rate
    pub fn with_request_rate(mut self, rate: RequestRate) -> Self {
        self.request_rate = rate;
        self
    }

    /// Gate execution behind a semaphore of `limit` permits
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    /// Seed the arrival schedule
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.request_rate.validate()?;

        if self.max_in_flight == Some(0) {
            return Err(ConfigError::InvalidConcurrency(
                "max in-flight requests must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Retry policy for transient backend errors
///
/// Backoff before retry `n` (1-based) is `initial_backoff * multiplier^(n-1)`,
/// capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt before giving up
    pub max_retries: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_backoff: Duration,

    /// Upper bound on any single delay
    #[serde(with = "humantime_serde")]
    pub max_backoff: Duration,

    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 8,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately, up to `max_retries` times
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::immediate(0)
    }

    /// Set the retry cap
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first delay
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the delay cap
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Delay to wait before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.powi(retry.saturating_sub(1) as i32);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        let cap = self.max_backoff.as_secs_f64();
        if !secs.is_finite() || secs >= cap {
            self.max_backoff
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(ConfigError::InvalidRetryPolicy(format!(
                "backoff multiplier must be at least 1.0, got {}",
                self.multiplier
            )));
        }
        if self.initial_backoff > self.max_backoff {
            return Err(ConfigError::InvalidRetryPolicy(
                "initial backoff exceeds max backoff".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid arrival rate
    #[error("Invalid request rate: {0}")]
    InvalidRate(String),

    /// Invalid concurrency ceiling
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid retry policy
    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}
