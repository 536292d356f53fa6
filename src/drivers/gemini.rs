//! Gemini generateContent 驱动 — Google Gemini 特有的请求/响应格式转换
//!
//! Google Gemini generateContent API driver. Key differences:
//! - Uses `contents` instead of `messages`, with `parts` instead of `content`.
//! - Roles: `user` and `model` (not `assistant`). System uses `system_instruction`.
//! - `generationConfig` wraps `maxOutputTokens`.
//! - Response: `candidates[0].content.parts[*].text`.
//! - API key travels in the `x-goog-api-key` header, never in the URL.

use serde_json::Value;

use crate::error::{Error, ErrorContext};
use crate::types::{ConversationPayload, Message, MessageRole};

use super::{
    require_messages, BuiltinProvider, DriverRequest, DriverResponse, ProviderDriver, UsageInfo,
};

/// Google Gemini generateContent API driver.
#[derive(Debug, Default)]
pub struct GeminiDriver;

impl GeminiDriver {
    pub fn new() -> Self {
        Self
    }

    fn to_content(m: &Message) -> Value {
        let role = match m.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };
        serde_json::json!({
            "role": role,
            "parts": [{ "text": m.content }],
        })
    }

    /// History first, final turn last. generateContent answers the final
    /// turn, so it must come from the user.
    fn build_contents(payload: &ConversationPayload) -> Result<Vec<Value>, Error> {
        let Some((last, history)) = payload.split_last() else {
            return Ok(Vec::new());
        };
        if last.role != MessageRole::User {
            return Err(Error::validation_with_context(
                "final turn must be a user message",
                ErrorContext::new()
                    .with_field_path(format!("payload.messages[{}].role", history.len()))
                    .with_source("gemini_driver"),
            ));
        }
        let mut contents: Vec<Value> = history.iter().map(Self::to_content).collect();
        contents.push(Self::to_content(last));
        Ok(contents)
    }
}

impl ProviderDriver for GeminiDriver {
    fn provider(&self) -> BuiltinProvider {
        BuiltinProvider::Gemini
    }

    fn build_request(
        &self,
        payload: &ConversationPayload,
        model: &str,
        max_tokens: Option<u32>,
    ) -> Result<DriverRequest, Error> {
        require_messages(payload)?;

        let mut body = serde_json::json!({
            "contents": Self::build_contents(payload)?,
        });
        if let Some(sys) = payload.system() {
            body["system_instruction"] = serde_json::json!({ "parts": [{ "text": sys }] });
        }
        if let Some(mt) = max_tokens {
            body["generationConfig"] = serde_json::json!({ "maxOutputTokens": mt });
        }

        Ok(DriverRequest {
            path: format!("/v1beta/models/{}:generateContent", model),
            headers: Vec::new(),
            body,
        })
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("x-goog-api-key", api_key.to_string())]
    }

    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error> {
        // Gemini: { candidates: [{ content: { parts: [{text: "..."}] }, finishReason }], usageMetadata }
        let content = body
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .filter(|s| !s.is_empty());

        let finish_reason = body
            .pointer("/candidates/0/finishReason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        Ok(DriverResponse {
            content,
            finish_reason,
            usage,
        })
    }
}
