//! Decoded responses and per-request result records

use crate::request::{RequestId, ScheduledRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend response normalized by an adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text, without any echoed prompt
    pub text: String,

    /// Prompt tokens reported (or derived) for the request
    pub input_tokens: usize,

    /// Generated tokens reported (or derived) for the request
    pub output_tokens: usize,
}

impl Generation {
    /// Create a generation result
    pub fn new(text: impl Into<String>, input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            text: text.into(),
            input_tokens,
            output_tokens,
        }
    }
}

/// Measurement for one completed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Request this record belongs to
    pub request_id: RequestId,

    /// Generated text
    pub output_text: String,

    /// Prompt length in characters
    pub prompt_char_len: usize,

    /// Output length in characters, never below 1
    pub output_char_len: usize,

    /// Prompt tokens
    pub input_token_count: usize,

    /// Generated tokens
    pub output_token_count: usize,

    /// Wall-clock time from encoding to the final successful response body
    pub latency_seconds: f64,
}

impl ResultRecord {
    /// Build a record for `request` from its decoded generation
    pub fn new(request: &ScheduledRequest, generation: Generation, latency: Duration) -> Self {
        let output_char_len = generation.text.chars().count().max(1);
        Self {
            request_id: request.id,
            prompt_char_len: request.prompt_chars(),
            output_char_len,
            input_token_count: generation.input_tokens,
            output_token_count: generation.output_tokens,
            latency_seconds: latency.as_secs_f64(),
            output_text: generation.text,
        }
    }

    /// Latency as a Duration
    pub fn latency(&self) -> Duration {
        Duration::from_secs_f64(self.latency_seconds.max(0.0))
    }

    /// Output length used as a divisor
    pub fn effective_output_chars(&self) -> usize {
        self.output_char_len.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_generation() {
        let request = ScheduledRequest::new(3u64, "[INST]hi[/INST]");
        let record = ResultRecord::new(
            &request,
            Generation::new("hello", 3, 2),
            Duration::from_millis(1500),
        );

        assert_eq!(record.request_id, RequestId(3));
        assert_eq!(record.output_text, "hello");
        assert_eq!(record.prompt_char_len, 15);
        assert_eq!(record.output_char_len, 5);
        assert_eq!(record.input_token_count, 3);
        assert_eq!(record.output_token_count, 2);
        assert!((record.latency_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_output_clamped_to_one_char() {
        let request = ScheduledRequest::new(0u64, "prompt");
        let record = ResultRecord::new(&request, Generation::default(), Duration::ZERO);

        assert_eq!(record.output_text, "");
        assert_eq!(record.output_char_len, 1);
    }

    #[test]
    fn test_effective_output_chars_guards_zero() {
        let request = ScheduledRequest::new(0u64, "prompt");
        let mut record = ResultRecord::new(&request, Generation::default(), Duration::ZERO);
        record.output_char_len = 0;
        assert_eq!(record.effective_output_chars(), 1);
    }

    #[test]
    fn test_latency_roundtrip() {
        let request = ScheduledRequest::new(0u64, "p");
        let record = ResultRecord::new(
            &request,
            Generation::new("x", 1, 1),
            Duration::from_millis(250),
        );
        assert_eq!(record.latency(), Duration::from_millis(250));
    }
}
