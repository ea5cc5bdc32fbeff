//! Choosing a template entry for a new script.
//!
//! Fallback order:
//! 1. the category's designated best reference
//! 2. an entry demonstrating every required pattern
//! 3. an entry sharing a requested data source
//! 4. the first entry in the registry
//!
//! The excluded name (a broken entry being replaced) is never returned.

use serde::Serialize;
use sk_config::DataSourceProfile;
use sk_core::RegistryEntry;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    Designated,
    Patterns,
    SharedSource,
    FirstEntry,
}

impl ReferenceSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Designated => "designated best reference",
            Self::Patterns => "demonstrates required patterns",
            Self::SharedSource => "shares a data source",
            Self::FirstEntry => "first registry entry",
        }
    }
}

impl std::fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub source: ReferenceSource,
}

/// Walk the fallback chain. `None` only when nothing is eligible.
#[must_use]
pub fn select_reference(
    profile: &DataSourceProfile,
    sources: &[String],
    entries: &[RegistryEntry],
    exclude: Option<&str>,
) -> Option<Reference> {
    let candidates = || {
        entries
            .iter()
            .filter(move |entry| exclude != Some(entry.name.as_str()))
    };

    if let Some(designated) = profile
        .best_reference
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty() && exclude != Some(*name))
    {
        return Some(Reference {
            name: designated.to_string(),
            source: ReferenceSource::Designated,
        });
    }

    if !profile.required_patterns.is_empty() {
        if let Some(entry) = candidates().find(|entry| {
            profile
                .required_patterns
                .iter()
                .all(|pattern| entry.has_pattern(pattern))
        }) {
            return Some(reference(entry, ReferenceSource::Patterns));
        }
    }

    if let Some(entry) = candidates().find(|entry| entry.serves_any(sources)) {
        return Some(reference(entry, ReferenceSource::SharedSource));
    }

    candidates()
        .next()
        .map(|entry| reference(entry, ReferenceSource::FirstEntry))
}

fn reference(entry: &RegistryEntry, source: ReferenceSource) -> Reference {
    Reference {
        name: entry.name.clone(),
        source,
    }
}
