//! servebench-core: Core data structures for throughput benchmarking of
//! inference servers
//!
//! This crate provides the foundational types used across all servebench
//! components, including:
//!
//! - Request and result records
//! - Core traits (BackendAdapter, Executor, PromptSource)
//! - The Poisson arrival schedule and the dispatcher
//! - The slot-indexed metrics store and summary statistics
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arrival;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod store;
pub mod traits;

pub use arrival::{ArrivalDelays, ArrivalProcess};
pub use config::{ConfigError, DispatchMode, RequestRate, RetryPolicy, RunConfig};
pub use dispatch::{
    DispatchPhase, DispatchStats, Dispatcher, DispatcherBuilder, RunOutcome,
};
pub use error::{BenchError, BenchResult};
pub use metrics::{BenchmarkSummary, LatencyPercentiles};
pub use request::{RequestId, SamplingParams, ScheduledRequest};
pub use response::{Generation, ResultRecord};
pub use store::{MetricsStore, StoreError};
pub use traits::{
    BackendAdapter, CodecError, ExecuteError, Executor, PromptSource, SamplerError, WireRequest,
};
