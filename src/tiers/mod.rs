//! 模型分级注册表：按成本分级的模型目录与跨级回退链解析。
//!
//! # Tier Registry
//!
//! A read-only catalog of cost tiers (CHEAP / STANDARD / PREMIUM) and a
//! mapping from logical endpoints to a tier. Resolution is a pure function of
//! the catalog and an explicit [`Credentials`](crate::Credentials) set; it
//! performs no I/O and keeps no state between calls.
//!
//! ## Fallback chain
//!
//! For an endpoint mapped to tier `T`:
//!
//! 1. the usable models of `T`, cheapest first;
//! 2. then the usable models of every other tier in `CHEAP, STANDARD, PREMIUM`
//!    order, skipping any `(provider, name)` already in the chain.
//!
//! An endpoint configured for PREMIUM therefore still resolves when only a
//! CHEAP credential is configured.
//!
//! ```rust
//! use ai_tier_router::{Credentials, TierRegistry};
//!
//! let creds = Credentials::new().with("GEMINI_API_KEY", "g-key");
//! let resolved = TierRegistry::builtin()
//!     .resolve_for_endpoint("/chat", &creds)
//!     .unwrap()
//!     .expect("/chat needs a model");
//! assert_eq!(resolved.primary.provider, "gemini");
//! ```

pub mod catalog;
pub mod loader;
pub mod registry;

pub use catalog::{
    builtin_endpoints, builtin_tiers, EndpointMapping, ModelDescriptor, ModelTier, TierName,
    TokenCost,
};
pub use loader::CatalogFile;
pub use registry::{EndpointStatus, ResolvedModelConfig, StatusReport, TierRegistry};
