//! Provider id → adapter dispatch table with lazy, isolated construction.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::adapter::{HttpProviderAdapter, ProviderAdapter};
use crate::config::ServiceConfig;
use crate::drivers::BuiltinProvider;
use crate::{Error, Result};

type AdapterFactory = Box<dyn Fn() -> Result<Arc<dyn ProviderAdapter>> + Send + Sync>;

struct AdapterSlot {
    factory: AdapterFactory,
    instance: OnceCell<Arc<dyn ProviderAdapter>>,
}

impl AdapterSlot {
    fn lazy(factory: AdapterFactory) -> Self {
        Self {
            factory,
            instance: OnceCell::new(),
        }
    }

    fn ready(adapter: Arc<dyn ProviderAdapter>) -> Self {
        let instance = OnceCell::new();
        let slot_adapter = adapter.clone();
        let _ = instance.set(adapter);
        Self {
            factory: Box::new(move || Ok(slot_adapter.clone())),
            instance,
        }
    }

    /// A failed construction is not cached; the next call tries again.
    fn get(&self) -> Result<Arc<dyn ProviderAdapter>> {
        self.instance.get_or_try_init(|| (self.factory)()).cloned()
    }
}

/// Adapters keyed by provider id. Nothing is constructed until a provider is
/// first invoked, and a construction failure is confined to its own slot.
#[derive(Default)]
pub struct AdapterRegistry {
    slots: BTreeMap<String, AdapterSlot>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Gemini, OpenAI and Claude HTTP adapters. A provider compiled out via
    /// its cargo feature stays registered but reports `IntegrationMissing`.
    pub fn builtin(config: Arc<ServiceConfig>) -> Self {
        let mut registry = Self::empty();
        for provider in BuiltinProvider::ALL {
            let config = config.clone();
            registry.register_factory(provider.id(), move || {
                if !provider.is_enabled() {
                    return Err(Error::integration_missing(
                        provider.id(),
                        format!("built without the `{}` feature", provider.id()),
                    ));
                }
                debug!(provider = provider.id(), "initialising provider adapter");
                let adapter = HttpProviderAdapter::new(provider, &config)?;
                Ok(Arc::new(adapter) as Arc<dyn ProviderAdapter>)
            });
        }
        registry
    }

    pub fn register_factory<F>(&mut self, provider_id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn ProviderAdapter>> + Send + Sync + 'static,
    {
        self.slots
            .insert(provider_id.into(), AdapterSlot::lazy(Box::new(factory)));
    }

    /// Register an already-built adapter, replacing any existing entry.
    pub fn register(&mut self, provider_id: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) {
        self.slots
            .insert(provider_id.into(), AdapterSlot::ready(adapter));
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.slots.contains_key(provider_id)
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Resolve (and on first use, construct) the adapter for `provider_id`.
    pub fn get(&self, provider_id: &str) -> Result<Arc<dyn ProviderAdapter>> {
        self.slots
            .get(provider_id)
            .ok_or_else(|| Error::UnknownProvider(provider_id.to_string()))?
            .get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::adapter::ProviderReply;
    use crate::types::ConversationPayload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    #[async_trait]
    impl ProviderAdapter for Echo {
        fn provider_id(&self) -> &str {
            "echo"
        }

        async fn invoke(
            &self,
            model: &str,
            _payload: &ConversationPayload,
            _api_key: &str,
        ) -> Result<ProviderReply> {
            Ok(ProviderReply::text(model))
        }
    }

    #[test]
    fn unknown_provider() {
        let registry = AdapterRegistry::builtin(Arc::new(ServiceConfig::default()));
        assert!(matches!(
            registry.get("unknown-provider"),
            Err(Error::UnknownProvider(ref id)) if id == "unknown-provider"
        ));
    }

    #[test]
    fn factory_runs_once_on_first_use() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = AdapterRegistry::empty();
        registry.register_factory("echo", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo) as Arc<dyn ProviderAdapter>)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        registry.get("echo").unwrap();
        registry.get("echo").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_factory_is_isolated() {
        let mut registry = AdapterRegistry::empty();
        registry.register_factory("broken", || {
            Err(Error::integration_missing("broken", "sdk unavailable"))
        });
        registry.register("echo", Arc::new(Echo));
        assert!(matches!(
            registry.get("broken"),
            Err(Error::IntegrationMissing { .. })
        ));
        assert!(registry.get("echo").is_ok());
    }

    #[test]
    fn registered_adapter_is_shared() {
        let mut registry = AdapterRegistry::empty();
        registry.register("echo", Arc::new(Echo));
        let a = registry.get("echo").unwrap();
        let b = registry.get("echo").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let payload = ConversationPayload::prompt("hi");
        let reply = tokio_test::block_on(a.invoke("echo-1", &payload, "k")).unwrap();
        assert_eq!(reply.text, "echo-1");
    }

    #[test]
    fn builtin_registers_all_providers() {
        let registry = AdapterRegistry::builtin(Arc::new(ServiceConfig::default()));
        let ids: Vec<&str> = registry.provider_ids().collect();
        assert_eq!(ids, vec!["claude", "gemini", "openai"]);
    }
}
