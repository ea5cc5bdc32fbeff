//! Error types for sk-health.

use thiserror::Error;

/// Failure to run a subprocess at all.
///
/// A process that runs and exits non-zero, or times out, is not an error:
/// it is reported through [`crate::process::ProcessOutcome`].
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
