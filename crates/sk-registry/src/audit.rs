//! Consistency audit between the registry document and the filesystem.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use serde::Serialize;
use sk_core::RegistryEntry;

use crate::document::RegistryDocument;
use crate::layout;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MissingFiles {
    pub name: String,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaleHealth {
    pub name: String,
    pub last_checked: DateTime<Utc>,
    pub age_days: i64,
}

/// Findings of `validate` / `validate_and_sync`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub checked_at: DateTime<Utc>,
    pub total_entries: usize,
    /// Entries whose script or doc file no longer exists.
    pub missing_files: Vec<MissingFiles>,
    /// Scripts on disk that no entry points at, relative to the registry root.
    pub unregistered_scripts: Vec<String>,
    pub stale_health: Vec<StaleHealth>,
    pub never_checked: Vec<String>,
    /// Entries with legacy files past their removal date.
    pub legacy_due: Vec<String>,
    /// Entries this run flipped to `broken`. Always empty for a read-only audit.
    pub marked_broken: Vec<String>,
}

impl SyncReport {
    /// No missing files, no orphans, nothing stale.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_files.is_empty()
            && self.unregistered_scripts.is_empty()
            && self.stale_health.is_empty()
    }
}

pub(crate) fn audit(
    root: &Path,
    document: &RegistryDocument,
    script_extension: &str,
    stale_after_days: i64,
    now: DateTime<Utc>,
) -> SyncReport {
    let today = now.date_naive();
    let mut report = SyncReport {
        checked_at: now,
        total_entries: document.skills.len(),
        missing_files: Vec::new(),
        unregistered_scripts: find_unregistered(root, &document.skills, script_extension),
        stale_health: Vec::new(),
        never_checked: Vec::new(),
        legacy_due: Vec::new(),
        marked_broken: Vec::new(),
    };

    for entry in &document.skills {
        let missing = missing_paths(root, entry);
        if !missing.is_empty() {
            report.missing_files.push(MissingFiles {
                name: entry.name.clone(),
                paths: missing,
            });
        }

        match &entry.health {
            Some(health) => {
                let age_days = (now - health.last_checked).num_days();
                if age_days > stale_after_days {
                    report.stale_health.push(StaleHealth {
                        name: entry.name.clone(),
                        last_checked: health.last_checked,
                        age_days,
                    });
                }
            }
            None => report.never_checked.push(entry.name.clone()),
        }

        let legacy_due = !entry.legacy_files.is_empty()
            && entry.legacy_removal_date.is_some_and(|date| date <= today);
        if legacy_due {
            report.legacy_due.push(entry.name.clone());
        }
    }

    report
}

/// Registry-relative paths of an entry that are not regular files.
pub(crate) fn missing_paths(root: &Path, entry: &RegistryEntry) -> Vec<String> {
    [&entry.script_path, &entry.doc_path]
        .into_iter()
        .filter(|relative| !root.join(relative.as_str()).is_file())
        .cloned()
        .collect()
}

fn find_unregistered(root: &Path, entries: &[RegistryEntry], script_extension: &str) -> Vec<String> {
    if !root.is_dir() {
        return Vec::new();
    }

    let known: HashSet<String> = entries
        .iter()
        .flat_map(|entry| std::iter::once(&entry.script_path).chain(&entry.legacy_files))
        .map(|path| layout::normalize(path))
        .collect();

    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false);
    builder.filter_entry(|dent| {
        let name = dent.file_name().to_string_lossy();
        dent.depth() == 0 || !(name.starts_with('.') || name == "__pycache__")
    });

    let mut orphans: Vec<String> = builder
        .build()
        .filter_map(Result::ok)
        .filter(|dent| dent.file_type().is_some_and(|kind| kind.is_file()))
        .filter(|dent| {
            dent.path()
                .extension()
                .is_some_and(|ext| ext == script_extension)
        })
        .filter_map(|dent| {
            dent.path()
                .strip_prefix(root)
                .ok()
                .map(|relative| layout::normalize(&relative.to_string_lossy()))
        })
        .filter(|relative| !known.contains(relative))
        .collect();
    orphans.sort();
    orphans
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use sk_core::{EntryHealth, HealthStatus};
    use tempfile::TempDir;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 4, 12, 0, 0).unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn finds_missing_files_and_orphans() {
        let temp = TempDir::new().expect("tempdir should create");
        touch(temp.path(), "a.py");
        touch(temp.path(), "a.md");
        touch(temp.path(), "orphan/scripts/orphan.py");
        touch(temp.path(), "__pycache__/a.cpython-312.py");
        touch(temp.path(), ".hidden/x.py");

        let document = RegistryDocument {
            skills: vec![
                RegistryEntry::new("a", "a.py", "a.md"),
                RegistryEntry::new("b", "b.py", "b.md"),
            ],
            ..RegistryDocument::default()
        };

        let report = audit(temp.path(), &document, "py", 7, now());
        assert_eq!(report.total_entries, 2);
        assert_eq!(
            report.missing_files,
            vec![MissingFiles {
                name: "b".into(),
                paths: vec!["b.py".into(), "b.md".into()],
            }]
        );
        assert_eq!(report.unregistered_scripts, vec!["orphan/scripts/orphan.py"]);
        assert_eq!(report.never_checked, vec!["a", "b"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn health_older_than_threshold_is_stale() {
        let temp = TempDir::new().expect("tempdir should create");
        let mut fresh = RegistryEntry::new("fresh", "fresh.py", "fresh.md");
        fresh.health = Some(EntryHealth {
            status: HealthStatus::Healthy,
            last_checked: now() - Duration::days(7),
            issues: vec![],
        });
        let mut old = RegistryEntry::new("old", "old.py", "old.md");
        old.health = Some(EntryHealth {
            status: HealthStatus::Healthy,
            last_checked: now() - Duration::days(8),
            issues: vec![],
        });
        let document = RegistryDocument {
            skills: vec![fresh, old],
            ..RegistryDocument::default()
        };

        let report = audit(temp.path(), &document, "py", 7, now());
        assert_eq!(report.stale_health.len(), 1);
        assert_eq!(report.stale_health[0].name, "old");
        assert_eq!(report.stale_health[0].age_days, 8);
    }

    #[test]
    fn legacy_files_past_removal_date_are_due() {
        let temp = TempDir::new().expect("tempdir should create");
        let mut entry = RegistryEntry::new("a", "a/scripts/a.py", "a/SKILL.md");
        entry.legacy_files = vec!["a.py".into()];
        entry.legacy_removal_date = Some(now().date_naive());
        touch(temp.path(), "a.py");
        let document = RegistryDocument {
            skills: vec![entry],
            ..RegistryDocument::default()
        };

        let report = audit(temp.path(), &document, "py", 7, now());
        assert_eq!(report.legacy_due, vec!["a"]);
        // Retained legacy copies are not orphans.
        assert!(report.unregistered_scripts.is_empty());
    }
}
