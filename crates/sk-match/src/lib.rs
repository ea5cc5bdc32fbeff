//! # sk-match
//!
//! Semantic matcher for registry entries.
//!
//! Candidates must declare one of the requested data sources. Survivors
//! earn additive points for trigger phrases, name keywords, patterns,
//! complexity, and category; the weights and vocabularies come from
//! `MatchingConfig`.

pub mod matcher;
pub mod tokenize;

pub use matcher::SemanticMatcher;
