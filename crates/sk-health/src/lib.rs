//! # sk-health
//!
//! Health check engine for registry entries.
//!
//! [`HealthChecker`] turns one `RegistryEntry` into a `HealthReport` by
//! checking files, layout, syntax, and importability. It never writes the
//! registry. [`process::ScopedProcess`] is the timeout-bounded subprocess
//! runner shared with the verification harness.

pub mod checker;
pub mod error;
pub mod process;

pub use checker::{HealthChecker, HealthProbe};
pub use error::ProcessError;
pub use process::{ProcessOutcome, ScopedProcess};
