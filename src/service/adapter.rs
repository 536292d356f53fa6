//! Provider adapters: the common invoke contract and its HTTP implementation.

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::drivers::{BuiltinProvider, ProviderDriver, UsageInfo};
use crate::transport::HttpTransport;
use crate::types::ConversationPayload;
use crate::utils::scrub;
use crate::{Error, Result};

/// Plain-text reply from one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl ProviderReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
            usage: None,
        }
    }
}

/// One provider behind a common contract.
///
/// Implementations must be safe to share across concurrent invocations.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Issue exactly one call to `model`.
    async fn invoke(
        &self,
        model: &str,
        payload: &ConversationPayload,
        api_key: &str,
    ) -> Result<ProviderReply>;
}

/// Driver + transport adapter used for the built-in providers.
#[derive(Debug)]
pub struct HttpProviderAdapter {
    driver: Box<dyn ProviderDriver>,
    transport: HttpTransport,
    max_tokens: Option<u32>,
}

impl HttpProviderAdapter {
    pub fn new(provider: BuiltinProvider, config: &ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(provider.id(), config.base_url_for(provider), config)?;
        Ok(Self {
            driver: provider.driver(),
            transport,
            max_tokens: config.default_max_tokens,
        })
    }

    fn provider(&self) -> BuiltinProvider {
        self.driver.provider()
    }
}

#[async_trait]
impl ProviderAdapter for HttpProviderAdapter {
    fn provider_id(&self) -> &str {
        self.provider().id()
    }

    async fn invoke(
        &self,
        model: &str,
        payload: &ConversationPayload,
        api_key: &str,
    ) -> Result<ProviderReply> {
        let provider = self.provider();
        if api_key.is_empty() {
            return Err(Error::MissingCredential(
                provider.credential_name().to_string(),
            ));
        }

        let request = self.driver.build_request(payload, model, self.max_tokens)?;
        let mut headers = request.headers;
        headers.extend(self.driver.auth_headers(api_key));

        // Transport errors pass through as-is; the key is only ever sent in
        // headers and the URL is stripped from them.
        let start = Instant::now();
        let reply = self
            .transport
            .post_json(&request.path, &headers, &request.body)
            .await?;

        if !reply.is_success() {
            let message = self
                .driver
                .error_message(&reply.body)
                .unwrap_or_else(|| match &reply.body {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            warn!(
                provider = provider.id(),
                model,
                http_status = reply.status,
                duration_ms = start.elapsed().as_millis() as u64,
                "provider request failed"
            );
            return Err(Error::ProviderCall {
                provider: provider.id().to_string(),
                status: Some(reply.status),
                message: scrub(&message, api_key),
            });
        }

        let parsed = self.driver.parse_response(&reply.body)?;
        debug!(
            provider = provider.id(),
            model,
            duration_ms = start.elapsed().as_millis() as u64,
            finish_reason = parsed.finish_reason.as_deref().unwrap_or("unknown"),
            "provider request succeeded"
        );

        let Some(text) = parsed.content else {
            return Err(Error::ProviderCall {
                provider: provider.id().to_string(),
                status: Some(reply.status),
                message: format!(
                    "empty response (finish_reason: {})",
                    parsed.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        };

        Ok(ProviderReply {
            text,
            finish_reason: parsed.finish_reason,
            usage: parsed.usage,
        })
    }
}
