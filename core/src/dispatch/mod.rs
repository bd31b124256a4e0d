//! Request dispatch over a whole benchmark run
//!
//! The Dispatcher pulls scheduled requests from the ArrivalProcess and hands
//! each one to an Executor under one of two disciplines:
//!
//! - **Concurrent**: every scheduled request is spawned as its own tokio task
//!   the moment the schedule releases it; the arrival loop never waits for an
//!   execution. Once the schedule is exhausted the run drains every launched
//!   task. An optional semaphore caps how many execute at once without moving
//!   their launch times.
//! - **Sequential**: one request in flight; the next arrival gap starts only
//!   after the previous response, so gaps and latencies add up.
//!
//! Every execution writes its record into the slot of its request id in a
//! pre-sized MetricsStore. The run produces statistics only once every slot
//! is filled.
//!
//! # Example
//!
//! ```ignore
//! use servebench_core::{DispatcherBuilder, DispatchMode, RequestRate};
//!
//! let dispatcher = DispatcherBuilder::new()
//!     .mode(DispatchMode::Concurrent)
//!     .request_rate(RequestRate::PerSecond(8.0))
//!     .executor(executor)
//!     .build()?;
//!
//! let outcome = dispatcher.run(prompts).await?;
//! println!("{:?}", outcome.summary());
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::DispatcherBuilder;
pub use executor::{Dispatcher, RunOutcome};
pub use stats::{DispatchPhase, DispatchStats};
