//! Ephemeral reports exchanged between components.
//!
//! None of these are persisted as-is; `HealthReport::summary` is the only
//! projection that reaches the registry document.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entry::{EntryHealth, RegistryEntry};
use crate::enums::{HealthStatus, Strategy};

/// Outcome of the four health sub-checks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthChecks {
    pub exists: bool,
    pub structure_valid: bool,
    pub syntax_valid: bool,
    pub executable: bool,
}

impl HealthChecks {
    /// Derive the verdict. Missing or unparseable files are never recoverable.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        if !self.exists || !self.syntax_valid {
            HealthStatus::Broken
        } else if self.structure_valid && self.executable {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// Diagnosis of one registry entry against the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthReport {
    pub skill: String,
    pub status: HealthStatus,
    pub checks: HealthChecks,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// Assemble a report, deriving the status from the sub-checks.
    #[must_use]
    pub fn new(
        skill: impl Into<String>,
        checks: HealthChecks,
        issues: Vec<String>,
        recommendations: Vec<String>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            skill: skill.into(),
            status: checks.status(),
            checks,
            issues,
            recommendations,
            checked_at,
        }
    }

    /// The persisted projection of this report.
    #[must_use]
    pub fn summary(&self) -> EntryHealth {
        EntryHealth {
            status: self.status,
            last_checked: self.checked_at,
            issues: self.issues.clone(),
        }
    }
}

/// A scored registry candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub entry: RegistryEntry,
    pub score: u32,
    pub matched_reasons: Vec<String>,
}

/// Output of the strategy decision engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrategyDecision {
    pub strategy: Strategy,
    /// Entry to invoke or modify in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_entry: Option<String>,
    /// Entry to copy from when forking or generating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_entry: Option<String>,
    pub reason: String,
    pub action_plan: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
}
