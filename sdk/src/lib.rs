//! Roleplay SDK
//!
//! Shared types and the error taxonomy for the roleplay engine.
//! This crate does no I/O; it is used by the engine and by its tests.

/// Error types and handling
pub mod errors;

/// Stage, role, scoreboard and catalog types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, RoleplayErrorExt};
pub use types::{Price, ProductRecord, Role, RoleScript, Stage, StageRequest, StageScoreboard};
