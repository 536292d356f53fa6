use reqwest::Proxy;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ServiceConfig;
use crate::{Error, ErrorContext, Result};

/// Raw provider reply: HTTP status plus parsed body (`Value::String` when the
/// body is not JSON).
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Value,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON-over-HTTPS transport bound to one provider base URL.
///
/// `reqwest::Client` is an internally pooled, cloneable handle, so one
/// transport is shared by every concurrent call to its provider.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the client. Fails with [`Error::IntegrationMissing`] when the
    /// HTTP stack cannot be initialised in this environment.
    pub fn new(provider: &str, base_url: &str, config: &ServiceConfig) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL for {}: {}", provider, e),
                ErrorContext::new()
                    .with_field_path(format!("base_urls.{}", provider))
                    .with_source("http_transport"),
            )
        })?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(concat!("ai-tier-router/", env!("CARGO_PKG_VERSION")));

        if let Some(ref proxy_url) = config.proxy_url {
            if let Ok(proxy) = Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::integration_missing(provider, e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `base_url + path`. Non-2xx statuses are returned, not
    /// raised; transport failures are raised with the URL stripped.
    pub async fn post_json(
        &self,
        path: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<HttpReply> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(body);
        for (k, v) in headers {
            req = req.header(*k, v);
        }

        let resp = req.send().await.map_err(|e| Error::Transport(e.without_url()))?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.without_url()))?;
        debug!(status, bytes = text.len(), path, "provider response received");

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let t = HttpTransport::new("openai", "http://localhost:8080/", &ServiceConfig::default())
            .unwrap();
        assert_eq!(t.base_url(), "http://localhost:8080");
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = HttpTransport::new("openai", "not a url", &ServiceConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
