//! Built-in HTTP adapters against a local mockito server.
#![cfg(all(feature = "gemini", feature = "openai", feature = "claude"))]

use ai_tier_router::{
    AiService, ConversationPayload, Credentials, Error, Message, ModelDescriptor,
    ResolvedModelConfig, ServiceConfig, TierName, TokenCost,
};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn service_for(base_url: &str) -> AiService {
    let config = ServiceConfig::default()
        .with_timeout(Duration::from_secs(5))
        .with_base_url("gemini", base_url)
        .with_base_url("openai", base_url)
        .with_base_url("claude", base_url);
    AiService::new(config)
}

#[tokio::test]
async fn gemini_sends_key_in_header_and_history_in_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_header("x-goog-api-key", "g-key")
        .match_query(Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "What is 1pt?" }] },
                { "role": "model", "parts": [{ "text": "1.333px" }] },
                { "role": "user", "parts": [{ "text": "And 12pt?" }] }
            ],
            "system_instruction": { "parts": [{ "text": "Be brief." }] }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "16px" }] },
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let payload = ConversationPayload::new(vec![
        Message::user("What is 1pt?"),
        Message::assistant("1.333px"),
        Message::user("And 12pt?"),
    ])
    .with_system_instruction("Be brief.");

    let text = service_for(&server.url())
        .call_ai("gemini", "gemini-2.0-flash", &payload, "g-key")
        .await
        .unwrap();
    assert_eq!(text, "16px");
    mock.assert_async().await;
}

#[tokio::test]
async fn openai_uses_bearer_auth_and_system_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer o-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hello" }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "Hi there" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let payload = ConversationPayload::prompt("Hello").with_system_instruction("Be brief.");
    let text = service_for(&server.url())
        .call_ai("openai", "gpt-4o-mini", &payload, "o-key")
        .await
        .unwrap();
    assert_eq!(text, "Hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn claude_sends_version_header_and_top_level_system() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "a-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-5-haiku-20241022",
            "system": "Be brief.",
            "max_tokens": 4096
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "content": [{ "type": "text", "text": "Sure." }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 8, "output_tokens": 2 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let payload = ConversationPayload::prompt("Hello").with_system_instruction("Be brief.");
    let text = service_for(&server.url())
        .call_ai("claude", "claude-3-5-haiku-20241022", &payload, "a-key")
        .await
        .unwrap();
    assert_eq!(text, "Sure.");
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_scrubbed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": { "message": "API key secret-gemini-123 not valid" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = service_for(&server.url())
        .call_ai(
            "gemini",
            "gemini-1.5-flash",
            &ConversationPayload::prompt("hi"),
            "secret-gemini-123",
        )
        .await
        .unwrap_err();

    match &err {
        Error::ProviderCall {
            provider, status, ..
        } => {
            assert_eq!(provider, "gemini");
            assert_eq!(*status, Some(400));
        }
        other => panic!("expected ProviderCall, got {other:?}"),
    }
    assert!(!err.to_string().contains("secret-gemini-123"));
    assert!(err.to_string().contains("not valid"));
}

#[tokio::test]
async fn empty_completion_is_a_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{ "message": { "role": "assistant" }, "finish_reason": "content_filter" }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = service_for(&server.url())
        .call_ai("openai", "gpt-4o", &ConversationPayload::prompt("hi"), "o-key")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderCall { .. }));
    assert!(err.to_string().contains("content_filter"));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error_without_key() {
    let service = AiService::new(
        ServiceConfig::default()
            .with_timeout(Duration::from_secs(2))
            .with_base_url("openai", "http://127.0.0.1:1"),
    );
    let err = service
        .call_ai("openai", "gpt-4o", &ConversationPayload::prompt("hi"), "o-secret-key")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(!err.to_string().contains("o-secret-key"));
}

#[tokio::test]
async fn empty_key_is_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .expect(0)
        .create_async()
        .await;

    let err = service_for(&server.url())
        .call_ai("claude", "claude-3-5-sonnet-20241022", &ConversationPayload::prompt("hi"), "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingCredential(ref k) if k == "ANTHROPIC_API_KEY"));
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_falls_back_to_next_provider() {
    let mut server = Server::new_async().await;
    let gemini = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;
    let openai = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{ "message": { "content": "rewritten" }, "finish_reason": "stop" }],
                "usage": { "prompt_tokens": 1000000, "completion_tokens": 0, "total_tokens": 1000000 }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let resolved = ResolvedModelConfig {
        primary: ModelDescriptor::new(
            "gemini",
            "gemini-2.0-flash",
            TokenCost::new(0.10, 0.40),
            8192,
            "GEMINI_API_KEY",
        ),
        fallbacks: vec![ModelDescriptor::new(
            "openai",
            "gpt-4o-mini",
            TokenCost::new(0.15, 0.60),
            16384,
            "OPENAI_API_KEY",
        )],
        tier: TierName::Standard,
        endpoint: "/content-rewrite".into(),
    };
    let creds = Credentials::new()
        .with("GEMINI_API_KEY", "g-key")
        .with("OPENAI_API_KEY", "o-key");

    let result = service_for(&server.url())
        .call_ai_with_fallback(&resolved, &ConversationPayload::prompt("rewrite"), &creds)
        .await
        .unwrap();

    assert_eq!(result.response, "rewritten");
    assert_eq!(result.model_used.provider, "openai");
    assert_eq!(result.model_used.attempt_number, 2);
    assert!(result.model_used.was_fallback);
    assert_eq!(result.usage.map(|u| u.prompt_tokens), Some(1_000_000));
    assert!((result.estimated_cost_usd.unwrap() - 0.15).abs() < 1e-9);

    gemini.assert_async().await;
    openai.assert_async().await;
}
