//! TensorRT-LLM served through Triton's ensemble generate endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use servebench_core::{BackendAdapter, CodecError, Generation, SamplingParams, WireRequest};

use super::{from_body, to_wire};

const NAME: &str = "trt-llm";

/// Adapter for `POST /v2/models/ensemble/generate`
///
/// The ensemble reports no token ids by default. When they are absent the
/// character lengths of prompt and output stand in for token counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrtLlmAdapter;

#[derive(Debug, Serialize)]
struct TrtLlmRequest<'a> {
    text_input: &'a str,
    max_tokens: u32,
    bad_words: &'static str,
    stop_words: &'static str,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct TrtLlmResponse {
    text_output: String,
    #[serde(default)]
    input_token_ids: Option<Vec<i64>>,
    #[serde(default)]
    output_token_ids: Option<Vec<i64>>,
}

impl BackendAdapter for TrtLlmAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn path(&self) -> &'static str {
        "/v2/models/ensemble/generate"
    }

    fn encode(&self, prompt: &str, params: &SamplingParams) -> Result<WireRequest, CodecError> {
        let request = TrtLlmRequest {
            text_input: prompt,
            max_tokens: params.max_new_tokens,
            bad_words: "",
            stop_words: "",
            top_k: params.top_k,
        };
        to_wire(NAME, self.path(), &request)
    }

    fn decode(&self, prompt: &str, body: Value) -> Result<Generation, CodecError> {
        let response: TrtLlmResponse = from_body(NAME, body)?;
        let text = response.text_output.trim().to_string();

        let input_tokens = response
            .input_token_ids
            .map_or_else(|| prompt.chars().count(), |ids| ids.len());
        let output_tokens = response
            .output_token_ids
            .map_or_else(|| text.chars().count(), |ids| ids.len());

        Ok(Generation::new(text, input_tokens, output_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_payload() {
        let wire = TrtLlmAdapter
            .encode("Hi there", &SamplingParams::greedy())
            .unwrap();

        assert_eq!(wire.path, "/v2/models/ensemble/generate");
        assert_eq!(
            wire.body,
            json!({
                "text_input": "Hi there",
                "max_tokens": 1024,
                "bad_words": "",
                "stop_words": "",
                "top_k": 1
            })
        );
    }

    #[test]
    fn test_decode_falls_back_to_char_lengths() {
        let generation = TrtLlmAdapter
            .decode("four", json!({"text_output": " abcdef "}))
            .unwrap();

        assert_eq!(generation.text, "abcdef");
        assert_eq!(generation.input_tokens, 4);
        assert_eq!(generation.output_tokens, 6);
    }

    #[test]
    fn test_decode_prefers_token_ids() {
        let generation = TrtLlmAdapter
            .decode(
                "four",
                json!({
                    "text_output": "abcdef",
                    "input_token_ids": [1],
                    "output_token_ids": [2, 3]
                }),
            )
            .unwrap();

        assert_eq!(generation.input_tokens, 1);
        assert_eq!(generation.output_tokens, 2);
    }

    #[test]
    fn test_decode_missing_text_output() {
        let err = TrtLlmAdapter
            .decode("p", json!({"model_name": "ensemble"}))
            .unwrap_err();
        assert!(err.to_string().contains("text_output"));
    }
}
