//! Layout, complexity, health, strategy, and data-type enums.
//!
//! Registry-facing enums use `snake_case` serialization. `Strategy` serializes
//! in upper case because callers branch on the literal `REUSE` / `ADAPT` /
//! `CREATE` strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// StorageLayout
// ---------------------------------------------------------------------------

/// Where a skill's companion documentation lives.
///
/// ```text
/// legacy_flat        <name>.py + <name>.md side by side in the registry root
/// structured_folder  <folder>/SKILL.md + <folder>/scripts/<name>.py
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StorageLayout {
    #[default]
    LegacyFlat,
    StructuredFolder,
}

impl StorageLayout {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyFlat => "legacy_flat",
            Self::StructuredFolder => "structured_folder",
        }
    }
}

impl fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Complexity
// ---------------------------------------------------------------------------

/// Declared implementation complexity of a skill.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HealthStatus
// ---------------------------------------------------------------------------

/// Tri-state runnability verdict for a registry entry.
///
/// ```text
/// healthy   all four checks pass
/// degraded  files exist and parse, but structure or import fails
/// broken    files missing or syntax invalid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Broken,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Broken => "broken",
        }
    }

    /// Whether the entry can be invoked without modification.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How a request should be satisfied, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Reuse,
    Adapt,
    Create,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reuse => "REUSE",
            Self::Adapt => "ADAPT",
            Self::Create => "CREATE",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// Category of external data a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Trials,
    FdaDrugs,
    Patents,
    Publications,
}

impl DataType {
    pub const ALL: [Self; 4] = [
        Self::Trials,
        Self::FdaDrugs,
        Self::Patents,
        Self::Publications,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trials => "trials",
            Self::FdaDrugs => "fda_drugs",
            Self::Patents => "patents",
            Self::Publications => "publications",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_layout_serializes_snake_case() {
        let json = serde_json::to_string(&StorageLayout::StructuredFolder).unwrap();
        assert_eq!(json, "\"structured_folder\"");
        assert_eq!(StorageLayout::default(), StorageLayout::LegacyFlat);
    }

    #[test]
    fn strategy_serializes_upper_case() {
        let json = serde_json::to_string(&Strategy::Adapt).unwrap();
        assert_eq!(json, "\"ADAPT\"");
        let back: Strategy = serde_json::from_str("\"CREATE\"").unwrap();
        assert_eq!(back, Strategy::Create);
    }

    #[test]
    fn display_matches_serialized_form() {
        for status in [
            HealthStatus::Healthy,
            HealthStatus::Degraded,
            HealthStatus::Broken,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        for data_type in DataType::ALL {
            let json = serde_json::to_string(&data_type).unwrap();
            assert_eq!(json, format!("\"{data_type}\""));
        }
    }

    #[test]
    fn only_healthy_is_usable() {
        assert!(HealthStatus::Healthy.is_usable());
        assert!(!HealthStatus::Degraded.is_usable());
        assert!(!HealthStatus::Broken.is_usable());
    }
}
