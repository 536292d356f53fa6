//! # ai-tier-router
//!
//! 按成本分级的 AI 模型选择与跨厂商回退调用。
//!
//! Cost-tiered AI model selection with cross-provider fallback, used by the
//! online tools backend for its AI assistant endpoints.
//!
//! ## Overview
//!
//! - **Tier Registry** ([`tiers`]): a read-only catalog of CHEAP / STANDARD /
//!   PREMIUM models and an endpoint → tier mapping. Resolves an ordered,
//!   de-duplicated fallback chain for an endpoint and an explicit credential set.
//! - **Multi-Provider Invoker** ([`service`]): Gemini, OpenAI and Claude
//!   adapters behind one contract, plus a strictly sequential fallback walk.
//!
//! Credentials are always passed in explicitly ([`Credentials`]); nothing in
//! resolution or invocation reads the process environment on its own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_tier_router::{get_model_for_endpoint, AiService, ConversationPayload, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> ai_tier_router::Result<()> {
//!     let creds = Credentials::from_env();
//!     let Some(resolved) = get_model_for_endpoint("/chat", &creds)? else {
//!         return Ok(());
//!     };
//!
//!     let service = AiService::from_env();
//!     let payload = ConversationPayload::prompt("Convert 12pt to px");
//!     let result = service.call_ai_with_fallback(&resolved, &payload, &creds).await?;
//!     println!("{}", result.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tiers`] | Tier catalog, endpoint mapping, chain resolution, YAML loading |
//! | [`service`] | Adapter dispatch table and fallback walk |
//! | [`drivers`] | Per-provider request/response translation |
//! | [`transport`] | Pooled HTTP transport |
//! | [`config`] | Env-overridable adapter configuration |
//! | [`credentials`] | Explicit credential sets |
//! | [`types`] | Conversation payload types |

pub mod config;
pub mod credentials;
pub mod drivers;
pub mod service;
pub mod tiers;
pub mod transport;
pub mod types;
pub mod utils;

/// Error type for the library
pub mod error;

use std::collections::BTreeMap;

pub use config::ServiceConfig;
pub use credentials::Credentials;
pub use error::{AttemptError, Error, ErrorContext};
pub use service::{AiService, InvocationResult, ModelUsed, ProviderAdapter, ProviderReply};
pub use tiers::{
    EndpointMapping, ModelDescriptor, ModelTier, ResolvedModelConfig, StatusReport, TierName,
    TierRegistry, TokenCost,
};
pub use types::{ConversationPayload, Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Snapshot of the built-in tier catalog.
pub fn get_model_tiers() -> &'static BTreeMap<TierName, ModelTier> {
    TierRegistry::builtin().model_tiers()
}

/// Snapshot of the built-in endpoint mapping.
pub fn get_endpoint_mappings() -> &'static EndpointMapping {
    TierRegistry::builtin().endpoint_mappings()
}

/// Usable built-in models of `tier_name`, cheapest first.
pub fn get_available_models(
    tier_name: &str,
    credentials: &Credentials,
) -> Result<Vec<ModelDescriptor>> {
    TierRegistry::builtin().available_models(tier_name, credentials)
}

/// Resolve the built-in fallback chain for `endpoint`.
pub fn get_model_for_endpoint(
    endpoint: &str,
    credentials: &Credentials,
) -> Result<Option<ResolvedModelConfig>> {
    TierRegistry::builtin().resolve_for_endpoint(endpoint, credentials)
}
