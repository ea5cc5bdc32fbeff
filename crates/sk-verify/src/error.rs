//! Error types for sk-verify.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// A configured pattern table holds an invalid regular expression.
    #[error("invalid pattern in verify.{table}: '{pattern}': {source}")]
    InvalidPattern {
        table: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
