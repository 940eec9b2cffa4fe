//! Integration tests for the Gemini provider
//!
//! Runs the real HTTP client against a wiremock server.

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use roleplay_engine::config::GeminiConfig;
use roleplay_engine::llm::{gemini::GeminiProvider, LLMError, LLMProvider, Message};
use roleplay_engine::secrets::SecretString;

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn provider_for(server: &MockServer, key: Option<&str>) -> GeminiProvider {
    let config = GeminiConfig {
        base_url: format!("{}/v1beta", server.uri()),
        model: "gemini-test".to_string(),
        api_key_env: "ROLEPLAY_TEST_UNUSED_KEY".to_string(),
    };
    GeminiProvider::new(config, key.map(SecretString::from))
}

async fn respond_with(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hi"}]},
                {"role": "model", "parts": [{"text": "Hello!"}]},
                {"role": "user", "parts": [{"text": "Price?"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "It is "}, {"text": "$499."}]
                },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("test-key"));
    let reply = provider
        .generate(&[
            Message::user("Hi"),
            Message::model("Hello!"),
            Message::user("Price?"),
        ])
        .await
        .unwrap();

    assert_eq!(reply, "It is $499.");
}

#[tokio::test]
async fn test_generate_text_sends_single_user_turn() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Classify this"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "opening"}]}}]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, Some("test-key"));
    assert_eq!(provider.generate_text("Classify this").await.unwrap(), "opening");
}

#[tokio::test]
async fn test_rate_limit_maps_to_error() {
    let server = respond_with(429, json!({"error": {"code": 429}})).await;
    let err = provider_for(&server, Some("test-key"))
        .generate(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::RateLimitExceeded));
}

#[tokio::test]
async fn test_rejected_key_maps_to_authentication_failure() {
    let server = respond_with(403, json!({"error": {"message": "API key not valid"}})).await;
    let err = provider_for(&server, Some("bad-key"))
        .generate(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn test_server_error_maps_to_unavailable() {
    let server = respond_with(500, json!({"error": {"message": "internal"}})).await;
    let err = provider_for(&server, Some("test-key"))
        .generate(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::ProviderUnavailable(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_blocked_prompt_is_parse_error() {
    let server = respond_with(200, json!({"promptFeedback": {"blockReason": "SAFETY"}})).await;
    let err = provider_for(&server, Some("test-key"))
        .generate(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::ParseError(_)));
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, None);
    assert!(!provider.check_health().await);

    let err = provider.generate(&[Message::user("Hi")]).await.unwrap_err();
    match err {
        LLMError::AuthenticationFailed(reason) => {
            assert!(reason.contains("ROLEPLAY_TEST_UNUSED_KEY"))
        }
        other => panic!("unexpected error: {}", other),
    }
}
