//! Request types for benchmark operations

use serde::{Deserialize, Serialize};

/// Request identifier: the 0-based position of the prompt in the input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Slot index in the metrics store
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<usize> for RequestId {
    fn from(id: usize) -> Self {
        Self(id as u64)
    }
}

/// A prompt scheduled by the arrival process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRequest {
    /// Position in the input order
    pub id: RequestId,

    /// Prompt text, already wrapped in the model template
    pub prompt: String,
}

impl ScheduledRequest {
    /// Create a scheduled request
    pub fn new(id: impl Into<RequestId>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
        }
    }

    /// Prompt length in characters
    pub fn prompt_chars(&self) -> usize {
        self.prompt.chars().count()
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Temperature (0.0 = greedy)
    pub temperature: f32,

    /// Top-k cutoff
    pub top_k: u32,

    /// Top-p (nucleus) cutoff
    pub top_p: f32,

    /// Maximum tokens to generate
    pub max_new_tokens: u32,

    /// Repetition penalty (1.0 = disabled)
    pub repetition_penalty: f32,

    /// Whether to stream the response
    pub stream: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::greedy()
    }
}

impl SamplingParams {
    /// Greedy decoding so that repeated runs produce identical outputs
    pub fn greedy() -> Self {
        Self {
            temperature: 0.0,
            top_k: 1,
            top_p: 0.0,
            max_new_tokens: 1024,
            repetition_penalty: 1.0,
            stream: false,
        }
    }

    /// Greedy decoding with a different output cap
    pub fn with_max_new_tokens(max_new_tokens: u32) -> Self {
        Self {
            max_new_tokens,
            ..Self::greedy()
        }
    }
}
