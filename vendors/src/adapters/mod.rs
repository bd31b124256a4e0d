//! Wire translations, one per backend family
//!
//! Each adapter serializes a typed request struct and deserializes a typed
//! response struct; a missing field surfaces as a `CodecError` naming it.

mod chat;
mod ksana;
mod trt_llm;
mod vllm;

pub use chat::ChatServerAdapter;
pub use ksana::KsanaAdapter;
pub use trt_llm::TrtLlmAdapter;
pub use vllm::VllmAdapter;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use servebench_core::{CodecError, WireRequest};

/// Serialize `payload` as the body posted to `path`
fn to_wire(
    backend: &'static str,
    path: &'static str,
    payload: &impl Serialize,
) -> Result<WireRequest, CodecError> {
    let body = serde_json::to_value(payload).map_err(|e| CodecError::Encode {
        backend,
        reason: e.to_string(),
    })?;
    Ok(WireRequest { path, body })
}

/// Deserialize a response body into `T`
fn from_body<T: DeserializeOwned>(backend: &'static str, body: Value) -> Result<T, CodecError> {
    serde_json::from_value(body).map_err(|e| CodecError::malformed(backend, e))
}

/// Drop the first `prompt`'s worth of characters from an echoed output
fn strip_prompt(text: &str, prompt: &str) -> String {
    let skip = prompt.chars().count();
    text.chars().skip(skip).collect()
}

/// First element of a list field that must not be empty
fn first<T>(
    backend: &'static str,
    field: &'static str,
    list: Vec<T>,
) -> Result<T, CodecError> {
    list.into_iter()
        .next()
        .ok_or(CodecError::EmptyList { backend, field })
}
