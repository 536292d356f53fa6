//! Runtime configuration for provider adapters.
//!
//! Defaults are production-friendly and env-overridable:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `AI_HTTP_TIMEOUT_SECS` (or `AI_TIMEOUT_SECS`) | 30 | Per-attempt HTTP timeout |
//! | `AI_HTTP_POOL_MAX_IDLE_PER_HOST` | 32 | Idle connections kept per provider host |
//! | `AI_PROXY_URL` | unset | Proxy for all provider traffic |
//! | `AI_DEFAULT_MAX_TOKENS` | unset | `max_tokens` sent with every request (Claude falls back to 4096) |
//! | `GEMINI_BASE_URL` / `OPENAI_BASE_URL` / `ANTHROPIC_BASE_URL` | provider default | Base URL override |

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::drivers::BuiltinProvider;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_MAX_IDLE: usize = 32;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Applied to every provider call; bounds how long one candidate can stall a walk.
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub proxy_url: Option<String>,
    pub default_max_tokens: Option<u32>,
    /// Provider id → base URL.
    pub base_urls: HashMap<String, String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE,
            proxy_url: None,
            default_max_tokens: None,
            base_urls: HashMap::new(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn base_url_var(provider: BuiltinProvider) -> &'static str {
    match provider {
        BuiltinProvider::Gemini => "GEMINI_BASE_URL",
        BuiltinProvider::OpenAi => "OPENAI_BASE_URL",
        BuiltinProvider::Claude => "ANTHROPIC_BASE_URL",
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let timeout_secs = env_parse::<u64>("AI_HTTP_TIMEOUT_SECS")
            .or_else(|| env_parse::<u64>("AI_TIMEOUT_SECS"))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut base_urls = HashMap::new();
        for provider in BuiltinProvider::ALL {
            if let Ok(url) = env::var(base_url_var(provider)) {
                if !url.trim().is_empty() {
                    base_urls.insert(provider.id().to_string(), url.trim().to_string());
                }
            }
        }

        Self {
            timeout: Duration::from_secs(timeout_secs.max(1)),
            pool_max_idle_per_host: env_parse("AI_HTTP_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or(DEFAULT_POOL_MAX_IDLE),
            proxy_url: env::var("AI_PROXY_URL").ok().filter(|s| !s.is_empty()),
            default_max_tokens: env_parse::<u32>("AI_DEFAULT_MAX_TOKENS").filter(|n| *n > 0),
            base_urls,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override a provider's base URL (mock servers, regional gateways).
    pub fn with_base_url(mut self, provider: impl Into<String>, url: impl Into<String>) -> Self {
        self.base_urls.insert(provider.into(), url.into());
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = Some(max_tokens);
        self
    }

    pub fn base_url_for(&self, provider: BuiltinProvider) -> &str {
        self.base_urls
            .get(provider.id())
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }
}
