//! Backend adapters and the HTTP executor for servebench
//!
//! This crate provides implementations of the `BackendAdapter` trait for:
//!
//! - KsanaLLM (`ksana`, `ksana-server`)
//! - TensorRT-LLM via Triton (`trt-llm`)
//! - vLLM (`vllm`, `vllm-server`)
//! - evart (`evart`)
//!
//! and the `HttpExecutor`, which implements `Executor` on top of them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod client;
pub mod traits;

pub use adapters::{ChatServerAdapter, KsanaAdapter, TrtLlmAdapter, VllmAdapter};
pub use client::{ClientError, HttpExecutor, USER_AGENT};
pub use traits::{Backend, ConfigValidationError, EndpointConfig};
