use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Complexity, HealthStatus, StorageLayout};
use crate::errors::CoreError;

/// Last-known health of an entry, as persisted in the registry document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntryHealth {
    pub status: HealthStatus,
    pub last_checked: DateTime<Utc>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Identity, location, and declared capabilities of one reusable script.
///
/// Paths are registry-root-relative strings so the document stays portable
/// between machines. Unknown keys are rejected on load.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RegistryEntry {
    pub name: String,
    #[serde(default)]
    pub storage_layout: StorageLayout,
    pub script_path: String,
    pub doc_path: String,
    #[serde(default)]
    pub has_manifest: bool,
    #[serde(default)]
    pub description: String,
    /// Trigger phrases matched against free-text requests.
    #[serde(default)]
    pub capability_tags: Vec<String>,
    #[serde(default)]
    pub data_sources: BTreeSet<String>,
    #[serde(default)]
    pub patterns: BTreeSet<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,
    /// Pre-migration file locations awaiting removal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legacy_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_removal_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<EntryHealth>,
}

impl RegistryEntry {
    /// Minimal legacy-flat entry; capability metadata is filled in by the caller.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        script_path: impl Into<String>,
        doc_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            storage_layout: StorageLayout::LegacyFlat,
            script_path: script_path.into(),
            doc_path: doc_path.into(),
            has_manifest: false,
            description: String::new(),
            capability_tags: Vec::new(),
            data_sources: BTreeSet::new(),
            patterns: BTreeSet::new(),
            category: String::new(),
            complexity: Complexity::Simple,
            created: None,
            legacy_files: Vec::new(),
            legacy_removal_date: None,
            health: None,
        }
    }

    #[must_use]
    pub fn script_file(&self, root: &Path) -> PathBuf {
        root.join(&self.script_path)
    }

    #[must_use]
    pub fn doc_file(&self, root: &Path) -> PathBuf {
        root.join(&self.doc_path)
    }

    #[must_use]
    pub fn has_pattern(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    /// True when any of `sources` is among the entry's declared data sources.
    #[must_use]
    pub fn serves_any(&self, sources: &[String]) -> bool {
        sources.iter().any(|source| self.data_sources.contains(source))
    }

    #[must_use]
    pub fn health_status(&self) -> Option<HealthStatus> {
        self.health.as_ref().map(|health| health.status)
    }

    /// Check the structural invariants every stored entry must satisfy.
    pub fn validate(&self) -> Result<(), CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("skill name must not be empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(CoreError::Validation(format!(
                "skill name '{}' must not contain path separators",
                self.name
            )));
        }

        for (field, value) in [("script_path", &self.script_path), ("doc_path", &self.doc_path)] {
            if !is_contained_relative(value) {
                return Err(CoreError::Validation(format!(
                    "{field} '{value}' for '{}' must be relative to the registry root and stay inside it",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// A non-empty relative path made only of normal components.
#[must_use]
pub fn is_contained_relative(path: &str) -> bool {
    let path = Path::new(path);
    let mut saw_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => saw_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    saw_normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(name: &str) -> RegistryEntry {
        let mut entry = RegistryEntry::new(
            name,
            format!("{name}/scripts/{name}.py"),
            format!("{name}/SKILL.md"),
        );
        entry.storage_layout = StorageLayout::StructuredFolder;
        entry.has_manifest = true;
        entry
    }

    #[test]
    fn valid_structured_entry_passes() {
        assert!(structured("get_trials").validate().is_ok());
    }

    #[test]
    fn structured_entry_without_manifest_still_loads() {
        // Health checks report the missing manifest; the store must not refuse it.
        let mut entry = structured("get_trials");
        entry.has_manifest = false;
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        for bad in ["../outside.py", "/abs/path.py", "", "./"] {
            let entry = RegistryEntry::new("x", bad, "x.md");
            assert!(entry.validate().is_err(), "path {bad:?} should be rejected");
        }
    }

    #[test]
    fn nested_relative_paths_are_accepted() {
        assert!(is_contained_relative("a/b/c.py"));
        assert!(is_contained_relative("./a.py"));
        assert!(!is_contained_relative("a/../../b.py"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{"name":"x","script_path":"x.py","doc_path":"x.md","surprise":1}"#;
        let parsed = serde_json::from_str::<RegistryEntry>(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn optional_fields_take_documented_defaults() {
        let json = r#"{"name":"x","script_path":"x.py","doc_path":"x.md"}"#;
        let entry: RegistryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.storage_layout, StorageLayout::LegacyFlat);
        assert_eq!(entry.complexity, Complexity::Simple);
        assert!(!entry.has_manifest);
        assert!(entry.health.is_none());
        assert!(entry.data_sources.is_empty());
    }

    #[test]
    fn serves_any_checks_intersection() {
        let mut entry = structured("x");
        entry.data_sources.insert("ct_gov_mcp".into());
        assert!(entry.serves_any(&["pubmed_mcp".into(), "ct_gov_mcp".into()]));
        assert!(!entry.serves_any(&["pubmed_mcp".into()]));
        assert!(!entry.serves_any(&[]));
    }
}
