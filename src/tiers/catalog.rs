//! Tier catalog types and the built-in model list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::credentials::{ANTHROPIC_API_KEY, GEMINI_API_KEY, OPENAI_API_KEY};
use crate::{Error, Result};

/// Cost/quality bucket. Declaration order is the canonical tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TierName {
    Cheap,
    Standard,
    Premium,
}

impl TierName {
    pub const ALL: [TierName; 3] = [TierName::Cheap, TierName::Standard, TierName::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::Cheap => "CHEAP",
            TierName::Standard => "STANDARD",
            TierName::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CHEAP" => Ok(TierName::Cheap),
            "STANDARD" => Ok(TierName::Standard),
            "PREMIUM" => Ok(TierName::Premium),
            other => Err(Error::InvalidTier(other.to_string())),
        }
    }
}

/// Price in USD per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenCost {
    pub input: f64,
    pub output: f64,
}

impl TokenCost {
    pub const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }

    /// Combined price used for ordering candidates.
    pub fn total(&self) -> f64 {
        self.input + self.output
    }

    /// Informational cost of one call; never enforced as a budget.
    pub fn estimate_usd(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let ic = (input_tokens as f64 / 1_000_000.0) * self.input;
        let oc = (output_tokens as f64 / 1_000_000.0) * self.output;
        ic + oc
    }
}

/// One invocable model.
///
/// Field names are camelCase on the wire; catalogs written with the
/// snake_case names still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Provider id used for adapter dispatch (`gemini`, `openai`, `claude`).
    pub provider: String,
    /// Provider-native model name.
    pub name: String,
    #[serde(alias = "cost_per_million_tokens")]
    pub cost_per_million_tokens: TokenCost,
    /// Informational only.
    #[serde(alias = "max_tokens")]
    pub max_tokens: u32,
    /// Credential that must be present and non-empty for this model.
    #[serde(alias = "requires_key")]
    pub requires_key: String,
}

impl ModelDescriptor {
    pub fn new(
        provider: impl Into<String>,
        name: impl Into<String>,
        cost: TokenCost,
        max_tokens: u32,
        requires_key: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
            cost_per_million_tokens: cost,
            max_tokens,
            requires_key: requires_key.into(),
        }
    }

    /// `"provider/name"`, the identifier used in logs and attempt errors.
    pub fn id(&self) -> String {
        format!("{}/{}", self.provider, self.name)
    }

    pub fn same_model(&self, other: &ModelDescriptor) -> bool {
        self.provider == other.provider && self.name == other.name
    }

    pub fn total_cost(&self) -> f64 {
        self.cost_per_million_tokens.total()
    }
}

/// A named bucket of candidate models, listed in documentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTier {
    pub priority: u8,
    pub description: String,
    pub models: Vec<ModelDescriptor>,
}

/// Endpoint path → tier, or `None` when the endpoint needs no AI model.
pub type EndpointMapping = BTreeMap<String, Option<TierName>>;

fn gemini(name: &str, input: f64, output: f64, max_tokens: u32) -> ModelDescriptor {
    ModelDescriptor::new(
        "gemini",
        name,
        TokenCost::new(input, output),
        max_tokens,
        GEMINI_API_KEY,
    )
}

fn openai(name: &str, input: f64, output: f64, max_tokens: u32) -> ModelDescriptor {
    ModelDescriptor::new(
        "openai",
        name,
        TokenCost::new(input, output),
        max_tokens,
        OPENAI_API_KEY,
    )
}

fn claude(name: &str, input: f64, output: f64, max_tokens: u32) -> ModelDescriptor {
    ModelDescriptor::new(
        "claude",
        name,
        TokenCost::new(input, output),
        max_tokens,
        ANTHROPIC_API_KEY,
    )
}

/// Built-in tier catalog.
pub fn builtin_tiers() -> BTreeMap<TierName, ModelTier> {
    let mut tiers = BTreeMap::new();
    tiers.insert(
        TierName::Cheap,
        ModelTier {
            priority: 1,
            description: "Fast, low-cost models for short chat replies and simple text tasks"
                .into(),
            models: vec![
                gemini("gemini-1.5-flash-8b", 0.0375, 0.15, 8192),
                gemini("gemini-1.5-flash", 0.075, 0.30, 8192),
                openai("gpt-4o-mini", 0.15, 0.60, 16384),
            ],
        },
    );
    tiers.insert(
        TierName::Standard,
        ModelTier {
            priority: 2,
            description: "Balanced models for content rewriting and SEO suggestions".into(),
            models: vec![
                gemini("gemini-2.0-flash", 0.10, 0.40, 8192),
                openai("gpt-4o-mini", 0.15, 0.60, 16384),
                claude("claude-3-5-haiku-20241022", 0.80, 4.00, 8192),
            ],
        },
    );
    tiers.insert(
        TierName::Premium,
        ModelTier {
            priority: 3,
            description: "Highest quality models for code explanation and long-form analysis"
                .into(),
            models: vec![
                gemini("gemini-1.5-pro", 1.25, 5.00, 8192),
                openai("gpt-4o", 2.50, 10.00, 16384),
                claude("claude-3-5-sonnet-20241022", 3.00, 15.00, 8192),
            ],
        },
    );
    tiers
}

/// Built-in endpoint mapping for the tools backend.
pub fn builtin_endpoints() -> EndpointMapping {
    let mut m = EndpointMapping::new();
    m.insert("/chat".into(), Some(TierName::Cheap));
    m.insert("/summarize".into(), Some(TierName::Cheap));
    m.insert("/content-rewrite".into(), Some(TierName::Standard));
    m.insert("/seo-suggestions".into(), Some(TierName::Standard));
    m.insert("/code-explain".into(), Some(TierName::Premium));
    m.insert("/seo-analyze".into(), None);
    m.insert("/dns-lookup".into(), None);
    m.insert("/pagespeed".into(), None);
    m.insert("/ping".into(), None);
    m.insert("/ip-info".into(), None);
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_names_round_trip() {
        for tier in TierName::ALL {
            assert_eq!(tier.as_str().parse::<TierName>().unwrap(), tier);
        }
        assert!(matches!(
            "cheap".parse::<TierName>(),
            Err(Error::InvalidTier(ref s)) if s == "cheap"
        ));
    }

    #[test]
    fn canonical_order_follows_priority() {
        let tiers = builtin_tiers();
        let priorities: Vec<u8> = tiers.values().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
        assert_eq!(
            tiers.keys().copied().collect::<Vec<_>>(),
            TierName::ALL.to_vec()
        );
    }

    #[test]
    fn descriptor_uses_camel_case_json() {
        let model = gemini("gemini-1.5-flash", 0.075, 0.30, 8192);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["costPerMillionTokens"]["input"], 0.075);
        assert_eq!(json["maxTokens"], 8192);
        assert_eq!(json["requiresKey"], "GEMINI_API_KEY");
        assert!(json.get("requires_key").is_none());

        let snake: ModelDescriptor = serde_json::from_value(serde_json::json!({
            "provider": "gemini",
            "name": "gemini-1.5-flash",
            "cost_per_million_tokens": {"input": 0.075, "output": 0.30},
            "max_tokens": 8192,
            "requires_key": "GEMINI_API_KEY"
        }))
        .unwrap();
        assert_eq!(snake, model);
    }

    #[test]
    fn estimate_uses_per_million_pricing() {
        let cost = TokenCost::new(0.15, 0.60);
        let usd = cost.estimate_usd(1_000_000, 500_000);
        assert!((usd - 0.45).abs() < 1e-9);
        assert!((cost.total() - 0.75).abs() < 1e-9);
    }
}
