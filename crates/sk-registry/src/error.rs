//! Registry error types for sk-registry.

use std::path::PathBuf;

use sk_core::CoreError;
use thiserror::Error;

/// Errors from registry store and updater operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry document does not parse or is structurally invalid.
    /// Fatal for the current operation.
    #[error("Corrupt registry at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// No registry document exists yet.
    #[error("Registry not found at {0}; register a skill with `skl index add` first")]
    Missing(PathBuf),

    /// Lookup or validation failure on an entry.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A SKILL.md frontmatter block could not be parsed.
    #[error("Invalid manifest at {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// The write lock could not be acquired.
    #[error("Registry lock unavailable: {0}")]
    Lock(String),

    /// Filesystem failure on the store itself.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the unknown-skill case, which callers may recover from.
    #[must_use]
    pub const fn is_missing_entry(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotFound { .. }))
    }
}
