use super::{LLMError, LLMProvider, Message, MessageRole};
use crate::config::GeminiConfig;
use crate::secrets::SecretString;
use async_trait::async_trait;
use serde_json::json;

/// Google Gemini `generateContent` client
pub struct GeminiProvider {
    config: GeminiConfig,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider; a missing key makes every call fail with
    /// `AuthenticationFailed` without touching the network.
    pub fn new(config: GeminiConfig, api_key: Option<SecretString>) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider reading the key from the configured environment variable
    pub fn from_env(config: GeminiConfig) -> Self {
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "Gemini API key not set; generation calls will fail"
            );
        }
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Build the `contents` array of a generateContent request
fn build_payload(messages: &[Message]) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = messages
        .iter()
        .map(|msg| {
            json!({
                "role": match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Model => "model",
                },
                "parts": [{"text": msg.content}]
            })
        })
        .collect();

    json!({ "contents": contents })
}

/// Concatenate the text parts of the first candidate
fn extract_text(data: &serde_json::Value) -> super::Result<String> {
    let candidate = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))?;

    let content_item = candidate
        .get("content")
        .ok_or_else(|| LLMError::ParseError("No content in candidate".to_string()))?;

    let parts = content_item
        .get("parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| LLMError::ParseError("No parts in candidate content".to_string()))?;

    let mut full_text = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            full_text.push_str(text);
        }
    }

    Ok(full_text)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn check_health(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, messages: &[Message]) -> super::Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            LLMError::AuthenticationFailed(format!("{} is not set", self.config.api_key_env))
        })?;

        if messages.is_empty() {
            return Err(LLMError::InvalidRequest(
                "at least one message is required".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.config.model,
            turns = messages.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.unsecure())
            .json(&build_payload(messages))
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                400 | 404 => LLMError::InvalidRequest(text),
                401 | 403 => LLMError::AuthenticationFailed(text),
                429 => LLMError::RateLimitExceeded,
                _ => LLMError::ProviderUnavailable(format!(
                    "Gemini API error ({}): {}",
                    status, text
                )),
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        extract_text(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_maps_roles() {
        let payload = build_payload(&[Message::user("Hi"), Message::model("Hello!")]);
        assert_eq!(
            payload,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hi"}]},
                    {"role": "model", "parts": [{"text": "Hello!"}]}
                ]
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let data = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "buyer."}]}
            }]
        });
        assert_eq!(extract_text(&data).unwrap(), "Hello, buyer.");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let err = extract_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap_err();
        assert!(matches!(err, LLMError::ParseError(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = GeminiProvider::new(
            GeminiConfig {
                base_url: "http://localhost:1234/v1beta/".to_string(),
                model: "gemini-test".to_string(),
                api_key_env: "UNUSED".to_string(),
            },
            None,
        );
        assert_eq!(
            provider.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let provider = GeminiProvider::new(
            GeminiConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                ..GeminiConfig::default()
            },
            None,
        );
        assert!(!provider.check_health().await);
        let err = provider.generate_text("hi").await.unwrap_err();
        assert!(matches!(err, LLMError::AuthenticationFailed(_)));
    }
}
