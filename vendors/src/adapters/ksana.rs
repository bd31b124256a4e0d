//! KsanaLLM native generate endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use servebench_core::{BackendAdapter, CodecError, Generation, SamplingParams, WireRequest};

use super::{from_body, to_wire};

const NAME: &str = "ksana";

/// Adapter for `POST /generate` on a KsanaLLM server
#[derive(Debug, Clone, Copy, Default)]
pub struct KsanaAdapter;

#[derive(Debug, Serialize)]
struct KsanaRequest<'a> {
    prompt: &'a str,
    sampling_config: SamplingConfig,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct SamplingConfig {
    temperature: f32,
    topk: u32,
    topp: f32,
    repetition_penalty: f32,
    max_new_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct KsanaResponse {
    texts: String,
    #[serde(default)]
    input_token_ids: Vec<i64>,
    #[serde(default)]
    output_token_ids: Vec<i64>,
}

impl BackendAdapter for KsanaAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn path(&self) -> &'static str {
        "/generate"
    }

    fn encode(&self, prompt: &str, params: &SamplingParams) -> Result<WireRequest, CodecError> {
        let request = KsanaRequest {
            prompt,
            sampling_config: SamplingConfig {
                temperature: params.temperature,
                topk: params.top_k,
                topp: params.top_p,
                repetition_penalty: params.repetition_penalty,
                max_new_tokens: params.max_new_tokens,
            },
            stream: params.stream,
        };
        to_wire(NAME, self.path(), &request)
    }

    fn decode(&self, _prompt: &str, body: Value) -> Result<Generation, CodecError> {
        let response: KsanaResponse = from_body(NAME, body)?;
        Ok(Generation::new(
            response.texts.trim(),
            response.input_token_ids.len(),
            response.output_token_ids.len(),
        ))
    }
}
