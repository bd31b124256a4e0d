//! Chat-style server endpoints (`/v1/chat`)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use servebench_core::{BackendAdapter, CodecError, Generation, SamplingParams, WireRequest};

use super::{first, from_body, strip_prompt, to_wire};

/// Adapter for ksana-server and vllm-server
///
/// Temperature and top-p are fixed by the server protocol. No output cap is
/// sent.
#[derive(Debug, Clone, Copy)]
pub struct ChatServerAdapter {
    name: &'static str,
    echoes_prompt: bool,
}

impl ChatServerAdapter {
    /// ksana-server: content is the completion, usage is always reported
    pub fn ksana() -> Self {
        Self {
            name: "ksana-server",
            echoes_prompt: false,
        }
    }

    /// vllm-server: content starts with the prompt
    pub fn vllm() -> Self {
        Self {
            name: "vllm-server",
            echoes_prompt: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    prompt: &'a str,
    top_p: f32,
    temperature: u32,
    top_k: u32,
    num_beams: u32,
    repetition_penalty: f32,
    n: u32,
    delete_prompt_from_output: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    input_token_ids: Vec<i64>,
    #[serde(default)]
    output_token_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

impl BackendAdapter for ChatServerAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn path(&self) -> &'static str {
        "/v1/chat"
    }

    fn encode(&self, prompt: &str, params: &SamplingParams) -> Result<WireRequest, CodecError> {
        let request = ChatRequest {
            model: "default_model",
            prompt,
            top_p: 1.0,
            temperature: 1,
            top_k: params.top_k,
            num_beams: 1,
            repetition_penalty: params.repetition_penalty,
            n: 1,
            delete_prompt_from_output: 0,
        };
        to_wire(self.name, self.path(), &request)
    }

    fn decode(&self, prompt: &str, body: Value) -> Result<Generation, CodecError> {
        let response: ChatResponse = from_body(self.name, body)?;
        let content = first(self.name, "choices", response.choices)?.message.content;

        let text = if self.echoes_prompt {
            strip_prompt(&content, prompt).trim().to_string()
        } else {
            content
        };

        let (input_tokens, output_tokens) = match response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None if self.echoes_prompt => (
                response.input_token_ids.len(),
                response.output_token_ids.len(),
            ),
            None => return Err(CodecError::malformed(self.name, "missing field `usage`")),
        };

        Ok(Generation::new(text, input_tokens, output_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chat_body(content: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
        })
    }

    #[test]
    fn test_encode_payload() {
        let wire = ChatServerAdapter::ksana()
            .encode("Hello", &SamplingParams::greedy())
            .unwrap();

        assert_eq!(wire.path, "/v1/chat");
        assert_eq!(
            wire.body,
            json!({
                "model": "default_model",
                "prompt": "Hello",
                "top_p": 1.0,
                "temperature": 1,
                "top_k": 1,
                "num_beams": 1,
                "repetition_penalty": 1.0,
                "n": 1,
                "delete_prompt_from_output": 0
            })
        );
    }

    #[test]
    fn test_ksana_server_uses_usage() {
        let generation = ChatServerAdapter::ksana()
            .decode("Hello", chat_body(" Hi! "))
            .unwrap();

        // content is taken verbatim
        assert_eq!(generation.text, " Hi! ");
        assert_eq!(generation.input_tokens, 7);
        assert_eq!(generation.output_tokens, 3);
    }

    #[test]
    fn test_ksana_server_requires_usage() {
        let body = json!({"choices": [{"message": {"content": "Hi"}}]});
        let err = ChatServerAdapter::ksana().decode("Hello", body).unwrap_err();
        assert!(err.to_string().contains("usage"));
    }

    #[test]
    fn test_vllm_server_strips_prompt() {
        let generation = ChatServerAdapter::vllm()
            .decode("Hello", chat_body("Hello there, friend "))
            .unwrap();

        assert_eq!(generation.text, "there, friend");
        assert_eq!(generation.input_tokens, 7);
    }

    #[test]
    fn test_vllm_server_without_usage() {
        let body = json!({
            "choices": [{"message": {"content": "Hello world"}}],
            "output_token_ids": [5, 6]
        });
        let generation = ChatServerAdapter::vllm().decode("Hello", body).unwrap();

        assert_eq!(generation.text, "world");
        assert_eq!(generation.input_tokens, 0);
        assert_eq!(generation.output_tokens, 2);
    }

    #[test]
    fn test_decode_no_choices() {
        let err = ChatServerAdapter::vllm()
            .decode("p", json!({"choices": []}))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::EmptyList {
                backend: "vllm-server",
                field: "choices"
            }
        );
    }
}
