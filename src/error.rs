use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "tiers.CHEAP.models[1]")
    pub field_path: Option<String>,
    /// Additional context about the error
    pub details: Option<String>,
    /// Source of the error (e.g., "catalog_loader", "service_config")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// One failed candidate inside a fallback walk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AttemptError {
    /// `"provider/name"` of the candidate.
    pub model: String,
    pub error: String,
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

/// Unified error type for tier resolution and provider invocation.
///
/// Messages only ever carry credential *names*; secret values never reach
/// a variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid tier: {0} (expected one of CHEAP, STANDARD, PREMIUM)")]
    InvalidTier(String),

    #[error("No AI models available for endpoint {endpoint}: no credentials configured for any tier")]
    NoModelsAvailable { endpoint: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Missing API key: {0}")]
    MissingCredential(String),

    #[error("Provider integration missing for {provider}: {reason}")]
    IntegrationMissing { provider: String, reason: String },

    #[error("{provider} call failed{}: {message}", format_status(.status))]
    ProviderCall {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("All models failed: {}", format_attempts(.attempts))]
    AllModelsFailed { attempts: Vec<AttemptError> },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

fn format_attempts(attempts: &[AttemptError]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn integration_missing(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::IntegrationMissing {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Whether a fallback walk records this error and moves on to the next
    /// candidate, rather than surfacing it to the caller.
    pub fn is_per_candidate(&self) -> bool {
        !matches!(
            self,
            Error::InvalidTier(_)
                | Error::NoModelsAvailable { .. }
                | Error::UnknownProvider(_)
                | Error::AllModelsFailed { .. }
        )
    }

    /// The ordered attempt list of an aggregate failure.
    pub fn attempts(&self) -> Option<&[AttemptError]> {
        match self {
            Error::AllModelsFailed { attempts } => Some(attempts),
            _ => None,
        }
    }
}
