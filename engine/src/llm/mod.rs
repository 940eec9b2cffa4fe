//! Text-generation collaborator
//!
//! The engine treats the model as an opaque text generator. [`LLMProvider`]
//! accepts either one instruction string or an ordered transcript of
//! role-tagged turns and returns the generated text. The Gemini REST API is the
//! production implementation; tests substitute their own providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gemini;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One turn of a chat transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Who produced the turn
    pub role: MessageRole,

    /// Text of the turn
    pub content: String,
}

impl Message {
    /// Create a new user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new model turn
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.into(),
        }
    }
}

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Composed prompt sent on behalf of the user
    User,

    /// Reply generated by the model
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

/// A text generator the engine can talk to
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "gemini")
    fn name(&self) -> &str;

    /// Generate the next reply for `messages`, every turn so far, oldest first
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Generate text for a single standalone instruction
    async fn generate_text(&self, instruction: &str) -> Result<String> {
        self.generate(&[Message::user(instruction)]).await
    }

    /// Whether calls can be attempted at all, e.g. a credential is present
    async fn check_health(&self) -> bool {
        true
    }
}
