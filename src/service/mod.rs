//! 多厂商调用层：适配器分发与顺序回退。
//!
//! # Multi-Provider Invoker
//!
//! [`AiService`] owns the provider dispatch table and runs fallback walks.
//! It keeps no per-request state: every walk starts at the first candidate.
//!
//! ```rust,no_run
//! use ai_tier_router::{AiService, ConversationPayload, Credentials, TierRegistry};
//!
//! # async fn run() -> ai_tier_router::Result<()> {
//! let creds = Credentials::from_env();
//! let service = AiService::from_env();
//! if let Some(resolved) = TierRegistry::builtin().resolve_for_endpoint("/chat", &creds)? {
//!     let payload = ConversationPayload::prompt("How do I minify CSS?")
//!         .with_system_instruction("You are the site's tool assistant.");
//!     let result = service.call_ai_with_fallback(&resolved, &payload, &creds).await?;
//!     println!("{} (via {})", result.response, result.model_used.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod fallback;
pub mod registry;

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::credentials::Credentials;
use crate::tiers::{ModelDescriptor, ResolvedModelConfig};
use crate::types::ConversationPayload;
use crate::Result;

pub use adapter::{HttpProviderAdapter, ProviderAdapter, ProviderReply};
pub use fallback::{InvocationResult, ModelUsed};
pub use registry::AdapterRegistry;

#[derive(Debug)]
pub struct AiService {
    adapters: AdapterRegistry,
}

impl AiService {
    /// Built-in adapters configured by `config`.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            adapters: AdapterRegistry::builtin(Arc::new(config)),
        }
    }

    /// Built-in adapters configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    pub fn with_registry(adapters: AdapterRegistry) -> Self {
        Self { adapters }
    }

    /// Register or replace the adapter for `provider_id`.
    pub fn with_adapter(
        mut self,
        provider_id: impl Into<String>,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Self {
        self.adapters.register(provider_id, adapter);
        self
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    /// One call to `model` through the adapter registered for `provider_id`.
    pub async fn invoke_provider(
        &self,
        provider_id: &str,
        model: &ModelDescriptor,
        payload: &ConversationPayload,
        api_key: &str,
    ) -> Result<String> {
        self.call_ai(provider_id, &model.name, payload, api_key).await
    }

    /// Single-shot call for callers that already know the model; no fallback.
    pub async fn call_ai(
        &self,
        provider_id: &str,
        model_name: &str,
        payload: &ConversationPayload,
        api_key: &str,
    ) -> Result<String> {
        let reply = self.dispatch(provider_id, model_name, payload, api_key).await?;
        Ok(reply.text)
    }

    /// Look up (constructing on first use) the adapter and issue one call.
    pub(crate) async fn dispatch(
        &self,
        provider_id: &str,
        model_name: &str,
        payload: &ConversationPayload,
        api_key: &str,
    ) -> Result<ProviderReply> {
        let adapter = self.adapters.get(provider_id)?;
        adapter.invoke(model_name, payload, api_key).await
    }

    /// Try `[primary, fallbacks...]` in order until one succeeds.
    pub async fn call_ai_with_fallback(
        &self,
        resolved: &ResolvedModelConfig,
        payload: &ConversationPayload,
        credentials: &Credentials,
    ) -> Result<InvocationResult> {
        fallback::walk_chain(self, resolved, payload, credentials).await
    }
}
