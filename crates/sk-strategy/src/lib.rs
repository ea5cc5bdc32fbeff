//! # sk-strategy
//!
//! Chooses REUSE, ADAPT, or CREATE for a request and emits an action plan.
//!
//! Reuse is free, adaptation needs re-verification, and creation is the
//! fallback when nothing salvageable exists. The engine reads a registry
//! snapshot and a [`sk_health::HealthProbe`]; it never writes.

pub mod engine;
pub mod reference;

pub use engine::StrategyEngine;
pub use reference::{Reference, ReferenceSource, select_reference};
