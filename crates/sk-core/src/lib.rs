//! # sk-core
//!
//! Core types and error types for skillsmith.
//!
//! This crate provides the foundational types shared across all skillsmith crates:
//! - `RegistryEntry` and its persisted health summary
//! - Layout, complexity, health, strategy, and data-type enums
//! - Ephemeral reports produced by the health engine, matcher, and strategy engine
//! - The structured `Requirements` record a caller matches against
//! - Cross-cutting error types

pub mod entry;
pub mod enums;
pub mod errors;
pub mod reports;
pub mod requirements;

pub use entry::{EntryHealth, RegistryEntry};
pub use enums::{Complexity, DataType, HealthStatus, StorageLayout, Strategy};
pub use errors::CoreError;
pub use reports::{HealthChecks, HealthReport, MatchResult, StrategyDecision};
pub use requirements::Requirements;
