//! Engine errors
//!
//! Every `EngineError` carries a static operator hint and a recoverability flag
//! through [`RoleplayErrorExt`].
//!
//! Only `InvalidSession` is ever surfaced to HTTP clients. Catalog and script
//! load failures are logged and swallowed by the engine, and model failures are
//! folded into the response text, so the remaining variants mostly reach the
//! operator through logs and the `doctor` command.

use thiserror::Error;

/// Operator-facing context for engine errors
pub trait RoleplayErrorExt {
    /// Short remedy text; static, so it never echoes secrets or file paths
    fn user_hint(&self) -> &str;

    /// False when only a config fix and a restart will help
    fn is_recoverable(&self) -> bool;
}

/// Errors raised by the roleplay engine
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RoleplayErrorExt};
///
/// let error = EngineError::InvalidSession("abc".to_string());
/// assert_eq!(error.user_hint(), "Start a new session with GET /start");
/// assert!(error.is_recoverable());
///
/// let bad_port = EngineError::Config("port must not be 0".to_string());
/// assert!(!bad_port.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid session ID: {0}")]
    InvalidSession(String),

    // Data files
    #[error("Catalog load failed: {0}")]
    CatalogLoad(String),

    #[error("Script load failed for {role}: {reason}")]
    ScriptLoad { role: String, reason: String },

    // Model and transport
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl RoleplayErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::InvalidSession(_) => "Start a new session with GET /start",
            Self::CatalogLoad(_) => "Check that products.json or products.csv is well formed",
            Self::ScriptLoad { .. } => "Check that the role script files are readable",
            Self::LLMProvider(_) => "LLM provider unavailable. Check your API key and network",
            Self::Network(_) => "Network operation failed. Check your connection",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
