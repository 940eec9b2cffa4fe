//! Roleplay Engine Library
//!
//! Session scoring, stage classification and response composition for the
//! sales role-play chat server. Used by the `roleplay` binary and by the
//! integration tests.

/// Configuration management module
pub mod config;

/// Credential wrapper and secret scrubbing
pub mod secrets;

/// Text-generation provider abstraction
pub mod llm;

/// Product catalog and role script loading
pub mod catalog;

/// Session store and scoreboards
pub mod session;

/// Shared or per-session chat transcript
pub mod transcript;

/// Prompt stage classification
pub mod classifier;

/// Prompt assembly and reply generation
pub mod composer;

/// Process-scoped application state
pub mod state;

/// HTTP endpoint layer
pub mod api;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
