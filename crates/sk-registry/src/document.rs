//! The persisted registry document.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sk_core::{RegistryEntry, StorageLayout};

/// Counts of entries per storage layout.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MigrationStatus {
    pub total_skills: usize,
    pub legacy_flat: usize,
    pub structured_folder: usize,
}

impl MigrationStatus {
    #[must_use]
    pub fn from_entries(entries: &[RegistryEntry]) -> Self {
        let structured_folder = entries
            .iter()
            .filter(|entry| entry.storage_layout == StorageLayout::StructuredFolder)
            .count();
        Self {
            total_skills: entries.len(),
            legacy_flat: entries.len() - structured_folder,
            structured_folder,
        }
    }
}

/// Top-level registry file: `{ "skills": [...], "last_updated": ..., "migration_status": {...} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RegistryDocument {
    pub skills: Vec<RegistryEntry>,
    /// `YYYY-MM-DD` of the last write.
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub migration_status: MigrationStatus,
}

impl RegistryDocument {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.skills.iter().find(|entry| entry.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut RegistryEntry> {
        self.skills.iter_mut().find(|entry| entry.name == name)
    }

    /// First duplicated name, if any.
    #[must_use]
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.skills
            .iter()
            .map(|entry| entry.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    pub fn refresh_migration_status(&mut self) {
        self.migration_status = MigrationStatus::from_entries(&self.skills);
    }
}
