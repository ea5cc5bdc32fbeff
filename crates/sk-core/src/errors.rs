//! Cross-cutting error types for skillsmith.
//!
//! Component-specific errors (`RegistryError`, `ConfigError`, ...) live in
//! their own crates. The CLI converges all of them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any skillsmith crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Lookup for a skill name that is not in the registry.
    #[error("Skill not found in registry: {name}")]
    NotFound { name: String },

    /// An entry failed validation (paths, layout invariants, naming).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
