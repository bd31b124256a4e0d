//! vLLM-style `/generate` endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;
use servebench_core::{BackendAdapter, CodecError, Generation, SamplingParams, WireRequest};

use super::{first, from_body, strip_prompt, to_wire};

/// Smallest temperature the server accepts for greedy sampling
const MIN_TEMPERATURE: f32 = 1e-8;

/// Adapter for vLLM and evart
///
/// Both share a request schema and return a list of completions. vLLM
/// echoes the prompt in front of each completion, evart does not.
#[derive(Debug, Clone, Copy)]
pub struct VllmAdapter {
    name: &'static str,
    echoes_prompt: bool,
}

impl VllmAdapter {
    /// vLLM: completion text starts with the prompt
    pub fn echoing() -> Self {
        Self {
            name: "vllm",
            echoes_prompt: true,
        }
    }

    /// evart: completion text only
    pub fn evart() -> Self {
        Self {
            name: "evart",
            echoes_prompt: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct VllmRequest<'a> {
    prompt: &'a str,
    use_beam_search: bool,
    n: u32,
    temperature: f32,
    max_tokens: u32,
    repetition_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct VllmResponse {
    text: Vec<String>,
    output_token_ids: Vec<Vec<i64>>,
    #[serde(default)]
    input_token_ids: Vec<i64>,
}

impl BackendAdapter for VllmAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn path(&self) -> &'static str {
        "/generate"
    }

    fn encode(&self, prompt: &str, params: &SamplingParams) -> Result<WireRequest, CodecError> {
        let request = VllmRequest {
            prompt,
            use_beam_search: false,
            n: 1,
            temperature: params.temperature.max(MIN_TEMPERATURE),
            max_tokens: params.max_new_tokens,
            repetition_penalty: params.repetition_penalty,
        };
        to_wire(self.name, self.path(), &request)
    }

    fn decode(&self, prompt: &str, body: Value) -> Result<Generation, CodecError> {
        let response: VllmResponse = from_body(self.name, body)?;
        let raw = first(self.name, "text", response.text)?;
        let output_ids = first(self.name, "output_token_ids", response.output_token_ids)?;

        let text = if self.echoes_prompt {
            strip_prompt(&raw, prompt)
        } else {
            raw
        };

        Ok(Generation::new(
            text.trim(),
            response.input_token_ids.len(),
            output_ids.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_clamps_temperature() {
        let wire = VllmAdapter::echoing()
            .encode("Hi", &SamplingParams::greedy())
            .unwrap();

        assert_eq!(wire.path, "/generate");
        assert_eq!(wire.body["prompt"], "Hi");
        assert_eq!(wire.body["use_beam_search"], false);
        assert_eq!(wire.body["n"], 1);
        assert_eq!(wire.body["max_tokens"], 1024);
        assert_eq!(wire.body["repetition_penalty"], 1.0);
        let temperature = wire.body["temperature"].as_f64().unwrap();
        assert!(temperature > 0.0 && temperature < 1e-6);
    }

    #[test]
    fn test_vllm_strips_echoed_prompt() {
        let body = json!({
            "text": ["Tell me a joke. Why did the chicken cross the road?"],
            "output_token_ids": [[1, 2, 3, 4, 5, 6, 7, 8]]
        });
        let generation = VllmAdapter::echoing()
            .decode("Tell me a joke.", body)
            .unwrap();

        assert_eq!(generation.text, "Why did the chicken cross the road?");
        assert_eq!(generation.output_tokens, 8);
        assert_eq!(generation.input_tokens, 0);
    }

    #[test]
    fn test_evart_keeps_full_text() {
        let body = json!({
            "text": ["  Because.  "],
            "output_token_ids": [[9, 9]],
            "input_token_ids": [1, 2, 3, 4]
        });
        let generation = VllmAdapter::evart().decode("Why?", body).unwrap();

        assert_eq!(generation.text, "Because.");
        assert_eq!(generation.output_tokens, 2);
        assert_eq!(generation.input_tokens, 4);
    }

    #[test]
    fn test_decode_empty_completion_list() {
        let err = VllmAdapter::evart()
            .decode("p", json!({"text": [], "output_token_ids": [[1]]}))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::EmptyList {
                backend: "evart",
                field: "text"
            }
        );
    }

    #[test]
    fn test_decode_missing_token_ids() {
        let err = VllmAdapter::echoing()
            .decode("p", json!({"text": ["p ok"]}))
            .unwrap_err();
        assert!(err.to_string().contains("output_token_ids"));
    }
}
