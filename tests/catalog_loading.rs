//! Loading the shipped catalog files.

use ai_tier_router::{Credentials, Error, TierName, TierRegistry};
use std::path::PathBuf;

fn catalog_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("catalog")
        .join(name)
}

#[test]
fn default_catalog_matches_builtin() {
    let loaded = TierRegistry::from_yaml_file(catalog_path("default.yaml")).unwrap();
    let builtin = TierRegistry::builtin();
    assert_eq!(loaded.model_tiers(), builtin.model_tiers());
    assert_eq!(loaded.endpoint_mappings(), builtin.endpoint_mappings());
}

#[test]
fn gemini_only_catalog_resolves_without_other_keys() {
    let registry = TierRegistry::from_yaml_file(catalog_path("gemini-only.yaml")).unwrap();
    let creds = Credentials::new().with("GEMINI_API_KEY", "g");

    let resolved = registry
        .resolve_for_endpoint("/code-explain", &creds)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.tier, TierName::Premium);
    let ids: Vec<String> = resolved.candidates().map(|m| m.id()).collect();
    assert_eq!(
        ids,
        vec![
            "gemini/gemini-1.5-pro",
            "gemini/gemini-1.5-flash-8b",
            "gemini/gemini-2.0-flash",
        ]
    );
    assert!(registry
        .resolve_for_endpoint("/ping", &creds)
        .unwrap()
        .is_none());
}

#[test]
fn missing_file_is_a_configuration_error() {
    let err = TierRegistry::from_yaml_file(catalog_path("does-not-exist.yaml")).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err
        .context()
        .and_then(|c| c.field_path.as_deref())
        .is_some_and(|p| p.ends_with("does-not-exist.yaml")));
}

#[test]
fn duplicate_model_in_tier_is_rejected() {
    let yaml = r#"
tiers:
  CHEAP:
    priority: 1
    description: dup
    models:
      - { provider: gemini, name: gemini-1.5-flash, cost_per_million_tokens: { input: 0.075, output: 0.3 }, max_tokens: 8192, requires_key: GEMINI_API_KEY }
      - { provider: gemini, name: gemini-1.5-flash, cost_per_million_tokens: { input: 0.075, output: 0.3 }, max_tokens: 8192, requires_key: GEMINI_API_KEY }
  STANDARD: { priority: 2, description: "", models: [] }
  PREMIUM: { priority: 3, description: "", models: [] }
"#;
    let err = TierRegistry::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("tiers.CHEAP.models[1]")
    );
}

#[test]
fn custom_credential_names_are_read_from_env() {
    let yaml = r#"
tiers:
  CHEAP:
    priority: 1
    description: self-hosted gateway key
    models:
      - { provider: openai, name: gpt-4o-mini, costPerMillionTokens: { input: 0.15, output: 0.6 }, maxTokens: 16384, requiresKey: TOOLS_GATEWAY_OPENAI_KEY }
  STANDARD: { priority: 2, description: "", models: [] }
  PREMIUM: { priority: 3, description: "", models: [] }
endpoints:
  /chat: CHEAP
"#;
    let registry = TierRegistry::from_yaml_str(yaml).unwrap();
    std::env::set_var("TOOLS_GATEWAY_OPENAI_KEY", "gw-key");

    let names: Vec<&str> = registry.credential_names().into_iter().collect();
    assert_eq!(names, vec!["TOOLS_GATEWAY_OPENAI_KEY"]);

    let creds = Credentials::from_env_keys(registry.credential_names());
    let resolved = registry
        .resolve_for_endpoint("/chat", &creds)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.primary.id(), "openai/gpt-4o-mini");
    assert_eq!(
        registry.status(&creds).credentials.get("TOOLS_GATEWAY_OPENAI_KEY"),
        Some(&true)
    );
}
