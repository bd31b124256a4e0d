//! Builder pattern for Dispatcher construction

use crate::config::{DispatchMode, RequestRate, RunConfig};
use crate::error::{BenchError, BenchResult};
use crate::request::RequestId;
use crate::traits::Executor;

use super::executor::Dispatcher;

use std::sync::Arc;
use tokio::sync::mpsc;

/// Builder for creating Dispatcher instances
///
/// Provides ergonomic construction with validation.
///
/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .mode(DispatchMode::Sequential)
///     .request_rate(RequestRate::PerSecond(2.0))
///     .executor(executor)
///     .build()?;
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    config: RunConfig,
    executor: Option<Arc<dyn Executor>>,
    progress_tx: Option<mpsc::UnboundedSender<RequestId>>,
}

impl DispatcherBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the dispatch mode
    pub fn mode(mut self, mode: DispatchMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the arrival rate
    pub fn request_rate(mut self, rate: RequestRate) -> Self {
        self.config.request_rate = rate;
        self
    }

    /// Cap simultaneously executing requests
    pub fn max_in_flight(mut self, limit: Option<usize>) -> Self {
        self.config.max_in_flight = limit;
        self
    }

    /// Seed the arrival schedule
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the executor
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Publish completed request ids on `tx`
    pub fn progress(mut self, tx: mpsc::UnboundedSender<RequestId>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    ///
    /// Returns an error if no executor is set or the configuration is invalid.
    pub fn build(self) -> BenchResult<Dispatcher> {
        let executor = self
            .executor
            .ok_or_else(|| BenchError::missing_config("executor"))?;

        self.config.validate()?;

        let dispatcher = Dispatcher::new(self.config, executor);
        Ok(match self.progress_tx {
            Some(tx) => dispatcher.with_progress(tx),
            None => dispatcher,
        })
    }
}
