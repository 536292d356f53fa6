//! Sequential fallback walk over a resolved model chain.
//!
//! `NotStarted → TryingCandidate(i) → { Succeeded | TryingCandidate(i+1) | AllFailed }`
//!
//! Candidates are tried one at a time in chain order. Each gets exactly one
//! attempt; its credential is looked up only when its turn comes.

use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::AiService;
use crate::credentials::Credentials;
use crate::drivers::UsageInfo;
use crate::error::AttemptError;
use crate::tiers::{ResolvedModelConfig, TierName};
use crate::types::ConversationPayload;
use crate::{Error, Result};

/// Which candidate answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsed {
    pub provider: String,
    pub name: String,
    /// Tier the endpoint resolved for.
    pub tier: TierName,
    pub was_fallback: bool,
    /// 1-based position in the chain.
    pub attempt_number: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub response: String,
    pub model_used: ModelUsed,
    pub usage: Option<UsageInfo>,
    /// From the catalog's per-million pricing when the provider reported usage.
    pub estimated_cost_usd: Option<f64>,
}

pub(crate) async fn walk_chain(
    service: &AiService,
    resolved: &ResolvedModelConfig,
    payload: &ConversationPayload,
    credentials: &Credentials,
) -> Result<InvocationResult> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!(
        "ai_fallback",
        request_id = request_id.as_str(),
        endpoint = resolved.endpoint.as_str(),
        tier = resolved.tier.as_str(),
        candidates = resolved.len(),
    );

    async move {
        let mut attempts: Vec<AttemptError> = Vec::new();

        for (index, model) in resolved.candidates().enumerate() {
            let model_id = model.id();

            let Some(api_key) = credentials.get(&model.requires_key) else {
                debug!(
                    model = model_id.as_str(),
                    requires_key = model.requires_key.as_str(),
                    "skipping candidate without credential"
                );
                attempts.push(AttemptError {
                    model: model_id,
                    error: Error::MissingCredential(model.requires_key.clone()).to_string(),
                });
                continue;
            };

            let start = Instant::now();
            match service
                .dispatch(&model.provider, &model.name, payload, api_key)
                .await
            {
                Ok(reply) => {
                    info!(
                        model = model_id.as_str(),
                        attempt = index + 1,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "model call succeeded"
                    );
                    let estimated_cost_usd = reply.usage.map(|u| {
                        model
                            .cost_per_million_tokens
                            .estimate_usd(u.prompt_tokens, u.completion_tokens)
                    });
                    return Ok(InvocationResult {
                        response: reply.text,
                        model_used: ModelUsed {
                            provider: model.provider.clone(),
                            name: model.name.clone(),
                            tier: resolved.tier,
                            was_fallback: index > 0,
                            attempt_number: index + 1,
                        },
                        usage: reply.usage,
                        estimated_cost_usd,
                    });
                }
                // A catalog entry with no registered adapter cannot be routed around.
                Err(e) if !e.is_per_candidate() => return Err(e),
                Err(e) => {
                    warn!(
                        model = model_id.as_str(),
                        attempt = index + 1,
                        duration_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "model call failed, trying next candidate"
                    );
                    attempts.push(AttemptError {
                        model: model_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        warn!(attempts = attempts.len(), "all model candidates failed");
        Err(Error::AllModelsFailed { attempts })
    }
    .instrument(span)
    .await
}
