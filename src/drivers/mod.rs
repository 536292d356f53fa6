//! Provider 驱动层 — 将通用会话转换为各厂商的请求/响应格式
//!
//! Provider wire-format drivers. A driver is pure translation: it turns a
//! [`ConversationPayload`] into a provider-specific HTTP request and pulls the
//! reply text back out of the provider's response envelope. Transport and
//! credentials are handled by the HTTP adapter that owns the driver.

pub mod anthropic;
pub mod gemini;

use serde_json::Value;
use std::fmt;

use crate::credentials::{ANTHROPIC_API_KEY, GEMINI_API_KEY, OPENAI_API_KEY};
use crate::error::Error;
use crate::types::{ConversationPayload, MessageRole};

pub use anthropic::AnthropicDriver;
pub use gemini::GeminiDriver;

/// Built-in provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinProvider {
    Gemini,
    OpenAi,
    Claude,
}

impl BuiltinProvider {
    pub const ALL: [BuiltinProvider; 3] = [
        BuiltinProvider::Gemini,
        BuiltinProvider::OpenAi,
        BuiltinProvider::Claude,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuiltinProvider::Gemini => "gemini",
            BuiltinProvider::OpenAi => "openai",
            BuiltinProvider::Claude => "claude",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Conventional credential name for this provider.
    pub fn credential_name(&self) -> &'static str {
        match self {
            BuiltinProvider::Gemini => GEMINI_API_KEY,
            BuiltinProvider::OpenAi => OPENAI_API_KEY,
            BuiltinProvider::Claude => ANTHROPIC_API_KEY,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            BuiltinProvider::Gemini => "https://generativelanguage.googleapis.com",
            BuiltinProvider::OpenAi => "https://api.openai.com",
            BuiltinProvider::Claude => "https://api.anthropic.com",
        }
    }

    /// Whether this integration was compiled in.
    pub fn is_enabled(&self) -> bool {
        match self {
            BuiltinProvider::Gemini => cfg!(feature = "gemini"),
            BuiltinProvider::OpenAi => cfg!(feature = "openai"),
            BuiltinProvider::Claude => cfg!(feature = "claude"),
        }
    }

    pub fn driver(&self) -> Box<dyn ProviderDriver> {
        match self {
            BuiltinProvider::Gemini => Box::new(GeminiDriver::new()),
            BuiltinProvider::OpenAi => Box::new(OpenAiDriver::new()),
            BuiltinProvider::Claude => Box::new(AnthropicDriver::new()),
        }
    }
}

impl fmt::Display for BuiltinProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Provider request, relative to the adapter's base URL.
#[derive(Debug, Clone)]
pub struct DriverRequest {
    /// Path appended to the base URL (e.g. `/v1/chat/completions`).
    pub path: String,
    /// Provider-specific headers other than authentication.
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Normalized provider reply.
#[derive(Debug, Clone, Default)]
pub struct DriverResponse {
    pub content: Option<String>,
    /// Finish reason normalized to `stop` / `length` / `content_filter` / ...
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Translation contract between the generic payload and one provider API.
pub trait ProviderDriver: Send + Sync + fmt::Debug {
    fn provider(&self) -> BuiltinProvider;

    /// Build the request body and path for `model`.
    fn build_request(
        &self,
        payload: &ConversationPayload,
        model: &str,
        max_tokens: Option<u32>,
    ) -> Result<DriverRequest, Error>;

    /// Headers that carry the API key.
    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)>;

    /// Parse a successful response body.
    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error>;

    /// Best-effort human-readable message from an error body.
    fn error_message(&self, body: &Value) -> Option<String> {
        body.pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

pub(crate) fn require_messages(payload: &ConversationPayload) -> Result<(), Error> {
    if payload.messages.is_empty() {
        return Err(Error::validation_with_context(
            "conversation payload has no messages",
            crate::ErrorContext::new()
                .with_field_path("payload.messages")
                .with_source("driver"),
        ));
    }
    Ok(())
}

/// OpenAI chat completions driver.
#[derive(Debug, Default)]
pub struct OpenAiDriver;

impl OpenAiDriver {
    pub fn new() -> Self {
        Self
    }
}

impl ProviderDriver for OpenAiDriver {
    fn provider(&self) -> BuiltinProvider {
        BuiltinProvider::OpenAi
    }

    fn build_request(
        &self,
        payload: &ConversationPayload,
        model: &str,
        max_tokens: Option<u32>,
    ) -> Result<DriverRequest, Error> {
        require_messages(payload)?;

        let mut oai_messages: Vec<Value> = Vec::with_capacity(payload.messages.len() + 1);
        if let Some(sys) = payload.system() {
            oai_messages.push(serde_json::json!({ "role": "system", "content": sys }));
        }
        oai_messages.extend(payload.messages.iter().map(|m| {
            let role = match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            serde_json::json!({ "role": role, "content": m.content })
        }));

        let mut body = serde_json::json!({
            "model": model,
            "messages": oai_messages,
        });
        if let Some(mt) = max_tokens {
            body["max_tokens"] = serde_json::json!(mt);
        }

        Ok(DriverRequest {
            path: "/v1/chat/completions".into(),
            headers: Vec::new(),
            body,
        })
    }

    fn auth_headers(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![("authorization", format!("Bearer {}", api_key))]
    }

    fn parse_response(&self, body: &Value) -> Result<DriverResponse, Error> {
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(String::from);
        let finish_reason = body
            .pointer("/choices/0/finish_reason")
            .and_then(|v| v.as_str())
            .map(String::from);
        let usage = body.get("usage").map(|u| UsageInfo {
            prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0),
            total_tokens: u["total_tokens"].as_u64().unwrap_or(0),
        });

        Ok(DriverResponse {
            content,
            finish_reason,
            usage,
        })
    }
}
