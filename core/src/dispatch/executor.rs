//! Dispatch loop

use crate::arrival::ArrivalProcess;
use crate::config::{DispatchMode, RunConfig};
use crate::error::{BenchError, BenchResult};
use crate::metrics::BenchmarkSummary;
use crate::request::{RequestId, ScheduledRequest};
use crate::response::ResultRecord;
use crate::store::MetricsStore;
use crate::traits::Executor;

use super::stats::{DispatchPhase, DispatchStats};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One record per request, in request id order
    pub records: Vec<ResultRecord>,

    /// Wall-clock time of the whole run
    pub elapsed: Duration,

    /// Dispatch counters
    pub stats: DispatchStats,
}

impl RunOutcome {
    /// Aggregate the records
    pub fn summary(&self) -> BenchmarkSummary {
        BenchmarkSummary::from_records(&self.records, self.elapsed)
    }

    /// Output texts in request id order
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.output_text.as_str())
    }
}

/// Drives the arrival schedule and executes every request
///
/// One dispatcher owns one run configuration and one executor; each call to
/// [`Dispatcher::run`] gets a fresh metrics store sized to its prompts.
pub struct Dispatcher {
    config: RunConfig,
    executor: Arc<dyn Executor>,
    progress_tx: Option<mpsc::UnboundedSender<RequestId>>,
}

impl Dispatcher {
    /// Create a dispatcher
    ///
    /// Use `DispatcherBuilder` for validated construction.
    pub fn new(config: RunConfig, executor: Arc<dyn Executor>) -> Self {
        Self {
            config,
            executor,
            progress_tx: None,
        }
    }

    /// Publish the id of every stored record on `tx`
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<RequestId>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every prompt through the executor
    ///
    /// Configuration errors surface before any request is issued. In
    /// concurrent mode a failed execution leaves its slot empty and the run
    /// fails after draining; in sequential mode the first failure aborts.
    pub async fn run(&self, prompts: Vec<String>) -> BenchResult<RunOutcome> {
        self.config.validate()?;
        let arrivals = ArrivalProcess::new(prompts, self.config.request_rate, self.config.seed)?;
        let store = Arc::new(MetricsStore::with_capacity(arrivals.len()));

        tracing::info!(
            executor = self.executor.name(),
            mode = %self.config.mode,
            request_rate = %self.config.request_rate,
            max_in_flight = ?self.config.max_in_flight,
            requests = arrivals.len(),
            "Starting run"
        );

        let mut stats = DispatchStats::new();
        stats.start();

        match self.config.mode {
            DispatchMode::Concurrent => self.run_concurrent(arrivals, &store, &mut stats).await?,
            DispatchMode::Sequential => self.run_sequential(arrivals, &store, &mut stats).await?,
        }

        stats.stop();
        let records = store.freeze()?;
        stats.transition(DispatchPhase::Complete);

        let elapsed = stats.elapsed().unwrap_or_default();
        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            completed = stats.completed,
            "Run completed"
        );

        Ok(RunOutcome {
            records,
            elapsed,
            stats,
        })
    }

    async fn run_concurrent(
        &self,
        mut arrivals: ArrivalProcess,
        store: &Arc<MetricsStore>,
        stats: &mut DispatchStats,
    ) -> BenchResult<()> {
        let gate = self
            .config
            .max_in_flight
            .map(|permits| Arc::new(Semaphore::new(permits)));
        let mut ids = Vec::with_capacity(arrivals.len());
        let mut handles = Vec::with_capacity(arrivals.len());

        while let Some(request) = arrivals.next_request().await {
            let executor = Arc::clone(&self.executor);
            let store = Arc::clone(store);
            let gate = gate.clone();
            let progress_tx = self.progress_tx.clone();

            ids.push(request.id);
            stats.launched += 1;
            tracing::debug!(request_id = %request.id, "Launching request");

            handles.push(tokio::spawn(async move {
                let _permit = match gate {
                    Some(gate) => Some(
                        gate.acquire_owned()
                            .await
                            .map_err(|_| BenchError::shutdown())?,
                    ),
                    None => None,
                };
                execute_into(executor.as_ref(), request, &store, progress_tx.as_ref()).await
            }));
        }

        stats.transition(DispatchPhase::Draining);

        let results = futures::future::join_all(handles).await;
        let mut first_failure: Option<BenchError> = None;

        for (id, result) in ids.into_iter().zip(results) {
            let failure = match result {
                Ok(Ok(())) => {
                    stats.record_success();
                    continue;
                }
                Ok(Err(e)) => e,
                Err(e) => BenchError::Join(format!("request {id}: {e}")),
            };
            stats.record_failure();
            tracing::error!(request_id = %id, error = %failure, "Request failed");
            first_failure.get_or_insert(failure);
        }

        match first_failure {
            None => Ok(()),
            Some(first) => Err(BenchError::ExecutionFailed {
                failed: stats.failed,
                total: stats.launched,
                first: first.to_string(),
            }),
        }
    }

    async fn run_sequential(
        &self,
        mut arrivals: ArrivalProcess,
        store: &MetricsStore,
        stats: &mut DispatchStats,
    ) -> BenchResult<()> {
        while let Some(request) = arrivals.next_request().await {
            stats.launched += 1;
            let id = request.id;

            let result = execute_into(
                self.executor.as_ref(),
                request,
                store,
                self.progress_tx.as_ref(),
            )
            .await;

            if let Err(e) = result {
                stats.record_failure();
                tracing::error!(request_id = %id, error = %e, "Request failed, aborting run");
                return Err(e);
            }
            stats.record_success();
        }
        Ok(())
    }
}

/// Execute one request and store its record
async fn execute_into(
    executor: &dyn Executor,
    request: ScheduledRequest,
    store: &MetricsStore,
    progress_tx: Option<&mpsc::UnboundedSender<RequestId>>,
) -> BenchResult<()> {
    let id = request.id;
    let record = executor
        .execute(&request)
        .await
        .map_err(|e| BenchError::request(id.0, e))?;

    tracing::debug!(
        request_id = %id,
        latency_secs = record.latency_seconds,
        output_tokens = record.output_token_count,
        "Request completed"
    );

    store.insert(record)?;

    if let Some(tx) = progress_tx {
        // receiver may have gone away; progress is best effort
        let _ = tx.send(id);
    }
    Ok(())
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("executor", &self.executor.name())
            .field("progress", &self.progress_tx.is_some())
            .finish()
    }
}
