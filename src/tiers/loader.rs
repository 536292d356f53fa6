//! YAML catalog loading.
//!
//! ```yaml
//! tiers:
//!   CHEAP:
//!     priority: 1
//!     description: Fast replies
//!     models:
//!       - provider: gemini
//!         name: gemini-1.5-flash-8b
//!         costPerMillionTokens: { input: 0.0375, output: 0.15 }
//!         maxTokens: 8192
//!         requiresKey: GEMINI_API_KEY
//!   STANDARD: { priority: 2, description: "", models: [] }
//!   PREMIUM: { priority: 3, description: "", models: [] }
//! endpoints:
//!   /chat: CHEAP
//!   /ping: null
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use super::catalog::{EndpointMapping, ModelTier, TierName};
use super::registry::TierRegistry;
use crate::{Error, ErrorContext, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub tiers: BTreeMap<TierName, ModelTier>,
    #[serde(default)]
    pub endpoints: EndpointMapping,
}

impl TierRegistry {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        TierRegistry::new(file.tiers, file.endpoints)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("Failed to read catalog: {}", e),
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_source("catalog_loader"),
            )
        })?;
        let registry = Self::from_yaml_str(&content)?;
        info!(
            path = %path.display(),
            models = registry
                .model_tiers()
                .values()
                .map(|t| t.models.len())
                .sum::<usize>(),
            endpoints = registry.endpoint_mappings().len(),
            "loaded tier catalog"
        );
        Ok(registry)
    }

    /// Serialize the catalog back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        let file = CatalogFile {
            tiers: self.model_tiers().clone(),
            endpoints: self.endpoint_mappings().clone(),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;

    const MINIMAL: &str = r#"
tiers:
  CHEAP:
    priority: 1
    description: cheap
    models:
      - provider: gemini
        name: gemini-1.5-flash-8b
        costPerMillionTokens: { input: 0.0375, output: 0.15 }
        maxTokens: 8192
        requiresKey: GEMINI_API_KEY
  STANDARD: { priority: 2, description: standard, models: [] }
  PREMIUM: { priority: 3, description: premium, models: [] }
endpoints:
  /chat: CHEAP
  /ping: null
"#;

    #[test]
    fn loads_minimal_catalog() {
        let reg = TierRegistry::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(reg.endpoint_mappings().get("/ping"), Some(&None));
        let creds = Credentials::new().with("GEMINI_API_KEY", "k");
        let resolved = reg.resolve_for_endpoint("/chat", &creds).unwrap().unwrap();
        assert_eq!(resolved.primary.name, "gemini-1.5-flash-8b");
    }

    #[test]
    fn builtin_survives_yaml_round_trip() {
        let yaml = TierRegistry::builtin().to_yaml_string().unwrap();
        let reg = TierRegistry::from_yaml_str(&yaml).unwrap();
        assert_eq!(reg.model_tiers(), TierRegistry::builtin().model_tiers());
        assert_eq!(
            reg.endpoint_mappings(),
            TierRegistry::builtin().endpoint_mappings()
        );
    }

    #[test]
    fn unknown_endpoint_tier_fails_to_parse() {
        let bad = MINIMAL.replace("/chat: CHEAP", "/chat: GOLD");
        assert!(matches!(
            TierRegistry::from_yaml_str(&bad),
            Err(Error::Yaml(_))
        ));
    }
}
