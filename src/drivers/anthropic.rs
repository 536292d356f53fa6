//! Anthropic Messages API 驱动 — Claude 特有的请求/响应格式转换
//!
//! Anthropic Messages API driver. Handles the key differences from OpenAI:
//! - The system instruction is a top-level `system` parameter, not part of `messages`.
//! - Content uses typed blocks: `[{"type": "text", "text": "..."}]`.
//! - Response uses `content[*].text` instead of `choices[0].message.content`.
//! - `max_tokens` is required, not optional.

use serde_json::Value;

use crate::error::Error;
use crate::types::{ConversationPayload, MessageRole};

use super::{
    require_messages, BuiltinProvider, DriverRequest, DriverResponse, ProviderDriver, UsageInfo,
};

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API driver.
#[derive(Debug, Default)]
pub struct AnthropicDriver;

impl AnthropicDriver {
    pub fn new() -> Self {
        Self
    }
}

impl ProviderDriver for AnthropicDriver {
    fn provider(&self) -> BuiltinProvider {
        BuiltinProvider::Claude
    }

    fn build_request(
        &self,
        payload: &ConversationPayload,
        model: &str,
        max_tokens: Option<u32>,
    ) -> Result<DriverRequest, Error> {
        require_messages(payload)?;

        let msgs: Vec<Value> = payload
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                serde_json::json!({
                    "role": role,
                    "content": [{ "type": "text", "text": m.content }],
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": msgs,
            "max_tokens": max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(sys) = payload.system() {
            body["system"] = Value::String(sys.to_string());
        }

        Ok(DriverRequest {
            path: "/v1/messages".into(),
            headers: vec![("anthropic-version", ANTHROPIC_VERSION.to_string())],
            body,
        })
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("x-api-key", api_key.to_string())]
    }

    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error> {
        // Anthropic response: { content: [{type: "text", text: "..."}], stop_reason, usage }
        let content = body
            .get("content")
            .and_then(|c| c.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .filter(|s| !s.is_empty());

        let finish_reason = body
            .get("stop_reason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "end_turn" => "stop".to_string(),
                "max_tokens" => "length".to_string(),
                other => other.to_string(),
            });

        let usage = body.get("usage").map(|u| {
            let input = u["input_tokens"].as_u64().unwrap_or(0);
            let output = u["output_tokens"].as_u64().unwrap_or(0);
            UsageInfo {
                prompt_tokens: input,
                completion_tokens: output,
                total_tokens: input + output,
            }
        });

        Ok(DriverResponse {
            content,
            finish_reason,
            usage,
        })
    }
}
