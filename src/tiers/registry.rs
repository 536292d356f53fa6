//! Fallback-chain resolution over a read-only tier catalog.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::catalog::{
    builtin_endpoints, builtin_tiers, EndpointMapping, ModelDescriptor, ModelTier, TierName,
};
use crate::credentials::Credentials;
use crate::{Error, ErrorContext, Result};

static BUILTIN: Lazy<TierRegistry> = Lazy::new(|| TierRegistry {
    tiers: builtin_tiers(),
    endpoints: builtin_endpoints(),
});

/// Output of [`TierRegistry::resolve_for_endpoint`]. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModelConfig {
    pub primary: ModelDescriptor,
    /// Ordered fallbacks, excluding `primary`.
    pub fallbacks: Vec<ModelDescriptor>,
    /// The endpoint's own tier, even when `primary` comes from another one.
    pub tier: TierName,
    pub endpoint: String,
}

impl ResolvedModelConfig {
    /// `[primary, fallbacks...]` in attempt order.
    pub fn candidates(&self) -> impl Iterator<Item = &ModelDescriptor> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.fallbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Credential-aware snapshot for status endpoints. Carries names only.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Credential name → configured.
    pub credentials: BTreeMap<String, bool>,
    /// Tier → available model ids in cost order.
    pub tiers: BTreeMap<TierName, Vec<String>>,
    pub endpoints: BTreeMap<String, EndpointStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EndpointStatus {
    NoAiRequired,
    Ready {
        tier: TierName,
        primary: String,
        fallbacks: usize,
    },
    Unavailable {
        tier: TierName,
        reason: String,
    },
}

/// Static tier catalog plus endpoint mapping.
#[derive(Debug, Clone)]
pub struct TierRegistry {
    tiers: BTreeMap<TierName, ModelTier>,
    endpoints: EndpointMapping,
}

impl TierRegistry {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static TierRegistry {
        &BUILTIN
    }

    /// Build a registry from a custom catalog, enforcing catalog invariants.
    pub fn new(tiers: BTreeMap<TierName, ModelTier>, endpoints: EndpointMapping) -> Result<Self> {
        validate_catalog(&tiers)?;
        Ok(Self { tiers, endpoints })
    }

    pub fn model_tiers(&self) -> &BTreeMap<TierName, ModelTier> {
        &self.tiers
    }

    pub fn endpoint_mappings(&self) -> &EndpointMapping {
        &self.endpoints
    }

    /// Usable models of `tier_name`, cheapest first. Fails with
    /// [`Error::InvalidTier`] for names outside the fixed set.
    pub fn available_models(
        &self,
        tier_name: &str,
        credentials: &Credentials,
    ) -> Result<Vec<ModelDescriptor>> {
        let tier: TierName = tier_name.parse()?;
        Ok(self.available_models_in(tier, credentials))
    }

    /// Typed variant of [`available_models`](Self::available_models).
    pub fn available_models_in(
        &self,
        tier: TierName,
        credentials: &Credentials,
    ) -> Vec<ModelDescriptor> {
        let Some(entry) = self.tiers.get(&tier) else {
            return Vec::new();
        };
        let mut models: Vec<ModelDescriptor> = entry
            .models
            .iter()
            .filter(|m| credentials.has(&m.requires_key))
            .cloned()
            .collect();
        // `sort_by` is stable: equal costs keep catalog order.
        models.sort_by(|a, b| a.total_cost().total_cmp(&b.total_cost()));
        models
    }

    /// Resolve the ordered, de-duplicated fallback chain for `endpoint`.
    ///
    /// Returns `Ok(None)` for endpoints that need no AI model. The endpoint's
    /// own tier leads; the remaining tiers follow in canonical order.
    pub fn resolve_for_endpoint(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Option<ResolvedModelConfig>> {
        let tier = match self.endpoints.get(endpoint) {
            Some(Some(tier)) => *tier,
            Some(None) => return Ok(None),
            None => {
                debug!(endpoint, "endpoint has no tier mapping, treating as non-AI");
                return Ok(None);
            }
        };

        let mut chain = self.available_models_in(tier, credentials);
        for other in TierName::ALL.into_iter().filter(|t| *t != tier) {
            for model in self.available_models_in(other, credentials) {
                if !chain.iter().any(|m| m.same_model(&model)) {
                    chain.push(model);
                }
            }
        }

        let mut candidates = chain.into_iter();
        let Some(primary) = candidates.next() else {
            return Err(Error::NoModelsAvailable {
                endpoint: endpoint.to_string(),
            });
        };

        debug!(
            endpoint,
            tier = tier.as_str(),
            primary = primary.id().as_str(),
            "resolved model chain"
        );

        Ok(Some(ResolvedModelConfig {
            primary,
            fallbacks: candidates.collect(),
            tier,
            endpoint: endpoint.to_string(),
        }))
    }

    /// Every distinct `requires_key` in the catalog, sorted.
    ///
    /// Pass these to [`Credentials::from_env_keys`] so a custom catalog's
    /// credential names are read too.
    pub fn credential_names(&self) -> BTreeSet<&str> {
        self.tiers
            .values()
            .flat_map(|t| t.models.iter())
            .map(|m| m.requires_key.as_str())
            .collect()
    }

    /// Credential-aware status snapshot.
    pub fn status(&self, credentials: &Credentials) -> StatusReport {
        let creds = self
            .credential_names()
            .into_iter()
            .map(|name| (name.to_string(), credentials.has(name)))
            .collect();

        let tiers = self
            .tiers
            .keys()
            .map(|t| {
                let ids = self
                    .available_models_in(*t, credentials)
                    .iter()
                    .map(ModelDescriptor::id)
                    .collect();
                (*t, ids)
            })
            .collect();

        let endpoints = self
            .endpoints
            .iter()
            .map(|(path, tier)| {
                let status = match tier {
                    None => EndpointStatus::NoAiRequired,
                    Some(tier) => match self.resolve_for_endpoint(path, credentials) {
                        Ok(Some(resolved)) => EndpointStatus::Ready {
                            tier: *tier,
                            primary: resolved.primary.id(),
                            fallbacks: resolved.fallbacks.len(),
                        },
                        Ok(None) => EndpointStatus::NoAiRequired,
                        Err(e) => EndpointStatus::Unavailable {
                            tier: *tier,
                            reason: e.to_string(),
                        },
                    },
                };
                (path.clone(), status)
            })
            .collect();

        StatusReport {
            credentials: creds,
            tiers,
            endpoints,
        }
    }
}

fn validate_catalog(tiers: &BTreeMap<TierName, ModelTier>) -> Result<()> {
    for tier in TierName::ALL {
        if !tiers.contains_key(&tier) {
            return Err(Error::configuration_with_context(
                format!("tier {} is not defined", tier),
                ErrorContext::new()
                    .with_field_path(format!("tiers.{}", tier))
                    .with_source("tier_registry"),
            ));
        }
    }

    for (tier, entry) in tiers {
        for (idx, model) in entry.models.iter().enumerate() {
            let field = format!("tiers.{}.models[{}]", tier, idx);
            let cost = model.cost_per_million_tokens;
            let problem = if model.provider.is_empty() || model.name.is_empty() {
                Some("provider and name must be non-empty".to_string())
            } else if model.requires_key.is_empty() {
                Some("requires_key must name a credential".to_string())
            } else if model.max_tokens == 0 {
                Some("max_tokens must be positive".to_string())
            } else if !(cost.input.is_finite() && cost.output.is_finite())
                || cost.input < 0.0
                || cost.output < 0.0
            {
                Some("costs must be finite and non-negative".to_string())
            } else if entry.models[..idx].iter().any(|m| m.same_model(model)) {
                Some(format!("duplicate model {} within tier", model.id()))
            } else {
                None
            };

            if let Some(message) = problem {
                return Err(Error::configuration_with_context(
                    message,
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_source("tier_registry"),
                ));
            }
        }
    }
    Ok(())
}
