//! The registry's only writer.
//!
//! Every mutation takes the write lock, loads the whole document, applies
//! the change in memory, and saves the whole document back atomically.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use sk_config::RegistryConfig;
use sk_core::{
    CoreError, EntryHealth, HealthReport, HealthStatus, RegistryEntry, StorageLayout,
};
use tracing::{debug, info, warn};

use crate::audit::{self, SyncReport};
use crate::document::RegistryDocument;
use crate::draft::EntryDraft;
use crate::error::RegistryError;
use crate::layout;
use crate::lock;
use crate::store::RegistryStore;

/// Whether `add_or_update` created a new entry or replaced an existing one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Added,
    Updated,
}

impl UpsertOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
        }
    }
}

impl std::fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Applied<T> {
    Changed(T),
    Unchanged(T),
}

#[derive(Debug, Clone)]
pub struct RegistryUpdater {
    store: RegistryStore,
    script_extension: String,
    stale_after_days: i64,
    legacy_retention_days: u64,
    lock_timeout: Duration,
}

impl RegistryUpdater {
    #[must_use]
    pub fn new(store: RegistryStore, script_extension: impl Into<String>) -> Self {
        Self {
            store,
            script_extension: script_extension.into(),
            stale_after_days: 7,
            legacy_retention_days: 30,
            lock_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn from_config(config: &RegistryConfig, script_extension: &str) -> Self {
        Self {
            store: RegistryStore::from_config(config),
            script_extension: script_extension.to_string(),
            stale_after_days: config.stale_after_days,
            legacy_retention_days: u64::try_from(config.legacy_retention_days).unwrap_or(0),
            lock_timeout: Duration::from_secs(config.lock_timeout_secs),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &RegistryStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn read(&self) -> Result<RegistryDocument, RegistryError> {
        self.store.load()
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
        Ok(self.store.load()?.skills)
    }

    pub fn get(&self, name: &str) -> Result<RegistryEntry, RegistryError> {
        self.store
            .load()?
            .find(name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert `entry`, or replace the entry with the same name.
    ///
    /// The entry is stored as given. When replacing, an existing `created`
    /// date and `health` survive if the incoming entry leaves them unset, and
    /// a stored `last_checked` never moves backwards.
    pub fn add_or_update(&self, entry: RegistryEntry) -> Result<UpsertOutcome, RegistryError> {
        self.add_or_update_on(entry, Utc::now().date_naive())
    }

    pub fn add_or_update_on(
        &self,
        entry: RegistryEntry,
        today: NaiveDate,
    ) -> Result<UpsertOutcome, RegistryError> {
        self.upsert(entry, today, false)
    }

    /// Build `draft` against the registry root and upsert it. A newly added
    /// entry is dated today.
    pub fn register(&self, draft: &EntryDraft) -> Result<(RegistryEntry, UpsertOutcome), RegistryError> {
        let entry = draft.build(self.store.root(), &self.script_extension)?;
        let outcome = self.upsert(entry, Utc::now().date_naive(), true)?;
        let stored = self.get(draft.name.trim())?;
        Ok((stored, outcome))
    }

    fn upsert(
        &self,
        mut entry: RegistryEntry,
        today: NaiveDate,
        stamp_created: bool,
    ) -> Result<UpsertOutcome, RegistryError> {
        entry.validate()?;
        let name = entry.name.clone();

        let outcome = self.mutate(true, today, |document| {
            let outcome = if let Some(existing) = document.find_mut(&entry.name) {
                if entry.created.is_none() {
                    entry.created = existing.created;
                }
                entry.health = merge_health(entry.health.take(), existing.health.take());
                *existing = entry;
                UpsertOutcome::Updated
            } else {
                if stamp_created {
                    entry.created.get_or_insert(today);
                }
                document.skills.push(entry);
                UpsertOutcome::Added
            };
            Ok(Applied::Changed(outcome))
        })?;

        info!(skill = %name, outcome = %outcome, "registry entry {outcome}");
        Ok(outcome)
    }

    /// Replace only the `health` sub-object of `name`.
    pub fn update_health(
        &self,
        name: &str,
        status: HealthStatus,
        issues: Vec<String>,
    ) -> Result<EntryHealth, RegistryError> {
        self.update_health_at(name, status, issues, Utc::now())
    }

    /// Like [`Self::update_health`] with an explicit check time. The stored
    /// `last_checked` never moves backwards.
    pub fn update_health_at(
        &self,
        name: &str,
        status: HealthStatus,
        issues: Vec<String>,
        checked_at: DateTime<Utc>,
    ) -> Result<EntryHealth, RegistryError> {
        let health = self.mutate(false, checked_at.date_naive(), |document| {
            let entry = document.find_mut(name).ok_or_else(|| not_found(name))?;
            Ok(Applied::Changed(apply_health(entry, status, issues, checked_at)))
        })?;

        debug!(skill = %name, status = %health.status, "health recorded");
        Ok(health)
    }

    /// Persist the summary of a computed health report.
    pub fn record_report(&self, report: &HealthReport) -> Result<EntryHealth, RegistryError> {
        self.update_health_at(
            &report.skill,
            report.status,
            report.issues.clone(),
            report.checked_at,
        )
    }

    /// Move `name` to `target` layout paths and schedule its old files for removal.
    ///
    /// No-op when the entry already uses `target`.
    pub fn mark_migrated(
        &self,
        name: &str,
        target: StorageLayout,
    ) -> Result<RegistryEntry, RegistryError> {
        self.mark_migrated_on(name, target, Utc::now().date_naive())
    }

    pub fn mark_migrated_on(
        &self,
        name: &str,
        target: StorageLayout,
        today: NaiveDate,
    ) -> Result<RegistryEntry, RegistryError> {
        let removal_date = today
            .checked_add_days(Days::new(self.legacy_retention_days))
            .unwrap_or(today);

        self.mutate(false, today, |document| {
            let entry = document.find_mut(name).ok_or_else(|| not_found(name))?;
            if entry.storage_layout == target {
                return Ok(Applied::Unchanged(entry.clone()));
            }

            let paths = layout::paths_for(target, &entry.name, &entry.script_path);
            let old_paths = [
                std::mem::replace(&mut entry.script_path, paths.script_path),
                std::mem::replace(&mut entry.doc_path, paths.doc_path),
            ];
            for old in old_paths {
                let moved = old != entry.script_path && old != entry.doc_path;
                if moved && !entry.legacy_files.contains(&old) {
                    entry.legacy_files.push(old);
                }
            }

            entry.storage_layout = target;
            entry.has_manifest = target == StorageLayout::StructuredFolder;
            entry.legacy_removal_date = Some(removal_date);
            entry.validate()?;

            info!(
                skill = %name,
                layout = %target,
                removal_date = %removal_date,
                "registry entry migrated"
            );
            Ok(Applied::Changed(entry.clone()))
        })
    }

    // ------------------------------------------------------------------
    // Audit
    // ------------------------------------------------------------------

    /// Read-only consistency audit.
    pub fn validate(&self) -> Result<SyncReport, RegistryError> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<SyncReport, RegistryError> {
        let document = self.store.load()?;
        Ok(audit::audit(
            self.store.root(),
            &document,
            &self.script_extension,
            self.stale_after_days,
            now,
        ))
    }

    /// Audit, then mark entries with vanished files `broken` and refresh
    /// the migration counts. Entries are never removed.
    pub fn validate_and_sync(&self) -> Result<SyncReport, RegistryError> {
        self.sync_at(Utc::now())
    }

    pub fn sync_at(&self, now: DateTime<Utc>) -> Result<SyncReport, RegistryError> {
        let root = self.store.root().to_path_buf();
        self.mutate(false, now.date_naive(), |document| {
            let mut report = audit::audit(
                &root,
                document,
                &self.script_extension,
                self.stale_after_days,
                now,
            );

            for missing in &report.missing_files {
                let Some(entry) = document.find_mut(&missing.name) else {
                    continue;
                };
                let was_broken = entry.health_status() == Some(HealthStatus::Broken);
                let issue = format!("files missing: {}", missing.paths.join(", "));
                apply_health(entry, HealthStatus::Broken, vec![issue], now);
                if !was_broken {
                    warn!(skill = %entry.name, "files missing; marked broken");
                    report.marked_broken.push(entry.name.clone());
                }
            }

            Ok(Applied::Changed(report))
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock_path(&self) -> PathBuf {
        let mut path: OsString = self.store.index_path().as_os_str().to_owned();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn mutate<T>(
        &self,
        create_if_missing: bool,
        today: NaiveDate,
        apply: impl FnOnce(&mut RegistryDocument) -> Result<Applied<T>, RegistryError>,
    ) -> Result<T, RegistryError> {
        let _guard = lock::acquire(&self.lock_path(), self.lock_timeout)?;

        let mut document = if create_if_missing {
            self.store.load_or_empty()?
        } else {
            self.store.load()?
        };

        match apply(&mut document)? {
            Applied::Changed(value) => {
                self.store.save(&mut document, today)?;
                Ok(value)
            }
            Applied::Unchanged(value) => Ok(value),
        }
    }
}

fn not_found(name: &str) -> RegistryError {
    RegistryError::Core(CoreError::NotFound {
        name: name.to_string(),
    })
}

fn apply_health(
    entry: &mut RegistryEntry,
    status: HealthStatus,
    issues: Vec<String>,
    checked_at: DateTime<Utc>,
) -> EntryHealth {
    let last_checked = entry
        .health
        .as_ref()
        .map_or(checked_at, |previous| previous.last_checked.max(checked_at));
    let health = EntryHealth {
        status,
        last_checked,
        issues,
    };
    entry.health = Some(health.clone());
    health
}

/// Incoming health wins, but keeps the later of the two check times.
fn merge_health(
    incoming: Option<EntryHealth>,
    previous: Option<EntryHealth>,
) -> Option<EntryHealth> {
    match (incoming, previous) {
        (Some(mut incoming), Some(previous)) => {
            incoming.last_checked = incoming.last_checked.max(previous.last_checked);
            Some(incoming)
        }
        (incoming, previous) => incoming.or(previous),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn updater(temp: &TempDir) -> RegistryUpdater {
        RegistryUpdater::new(RegistryStore::new(temp.path(), "index.json"), "py")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 4).unwrap()
    }

    #[test]
    fn add_then_update_reports_outcome() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);

        let entry = RegistryEntry::new("a", "a.py", "a.md");
        let first = updater.add_or_update_on(entry.clone(), today()).expect("add");
        let second = updater.add_or_update_on(entry, today()).expect("update");

        assert_eq!(first, UpsertOutcome::Added);
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(updater.entries().expect("entries").len(), 1);
    }

    #[test]
    fn update_keeps_created_and_health() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        let mut original = RegistryEntry::new("a", "a.py", "a.md");
        original.created = Some(today());
        updater.add_or_update_on(original, today()).expect("add");
        updater
            .update_health("a", HealthStatus::Healthy, vec![])
            .expect("health");

        let mut replacement = RegistryEntry::new("a", "a.py", "a.md");
        replacement.description = "new".into();
        updater.add_or_update(replacement).expect("update");

        let stored = updater.get("a").expect("entry");
        assert_eq!(stored.description, "new");
        assert_eq!(stored.created, Some(today()));
        assert_eq!(stored.health_status(), Some(HealthStatus::Healthy));
    }

    #[test]
    fn unknown_name_is_missing_entry() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        updater
            .add_or_update_on(RegistryEntry::new("a", "a.py", "a.md"), today())
            .expect("add");

        let err = updater
            .update_health("nope", HealthStatus::Broken, vec![])
            .expect_err("unknown skill");
        assert!(err.is_missing_entry());
        assert!(updater.get("nope").expect_err("unknown").is_missing_entry());
    }

    #[test]
    fn writes_before_any_add_need_a_registry() {
        let temp = TempDir::new().expect("tempdir should create");
        let err = updater(&temp)
            .update_health("a", HealthStatus::Healthy, vec![])
            .expect_err("no registry yet");
        assert!(matches!(err, RegistryError::Missing(_)));
    }

    #[test]
    fn health_timestamp_never_moves_backwards() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        updater
            .add_or_update_on(RegistryEntry::new("a", "a.py", "a.md"), today())
            .expect("add");

        let later = Utc.with_ymd_and_hms(2025, 11, 4, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();
        updater
            .update_health_at("a", HealthStatus::Healthy, vec![], later)
            .expect("first");
        let health = updater
            .update_health_at("a", HealthStatus::Degraded, vec!["x".into()], earlier)
            .expect("second");

        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.last_checked, later);
    }

    #[test]
    fn upsert_with_older_health_keeps_later_timestamp() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        updater
            .add_or_update_on(RegistryEntry::new("a", "a.py", "a.md"), today())
            .expect("add");
        let later = Utc.with_ymd_and_hms(2025, 11, 4, 0, 0, 0).unwrap();
        updater
            .update_health_at("a", HealthStatus::Healthy, vec![], later)
            .expect("health");

        let mut replacement = RegistryEntry::new("a", "a.py", "a.md");
        replacement.health = Some(EntryHealth {
            status: HealthStatus::Degraded,
            last_checked: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            issues: vec!["stale import".into()],
        });
        updater.add_or_update_on(replacement, today()).expect("update");

        let health = updater.get("a").expect("entry").health.expect("health");
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.issues, vec!["stale import"]);
        assert_eq!(health.last_checked, later);
    }

    #[test]
    fn upsert_with_newer_health_takes_its_timestamp() {
        let earlier = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 11, 4, 0, 0, 0).unwrap();
        let health = |last_checked: DateTime<Utc>| EntryHealth {
            status: HealthStatus::Healthy,
            last_checked,
            issues: vec![],
        };

        let merged = merge_health(Some(health(later)), Some(health(earlier)));
        assert_eq!(merged.map(|health| health.last_checked), Some(later));
        assert_eq!(merge_health(None, Some(health(earlier))), Some(health(earlier)));
        assert_eq!(merge_health(None, None), None);
    }

    #[test]
    fn plain_add_leaves_created_unset() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        let entry = RegistryEntry::new("a", "a.py", "a.md");
        updater.add_or_update_on(entry.clone(), today()).expect("add");

        assert_eq!(updater.get("a").expect("entry"), entry);
    }

    #[test]
    fn migration_to_same_layout_is_a_noop() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        updater
            .add_or_update_on(RegistryEntry::new("a", "a.py", "a.md"), today())
            .expect("add");
        let before = std::fs::read_to_string(updater.store().index_path()).unwrap();

        let entry = updater
            .mark_migrated("a", StorageLayout::LegacyFlat)
            .expect("noop");

        assert_eq!(entry.script_path, "a.py");
        assert_eq!(
            std::fs::read_to_string(updater.store().index_path()).unwrap(),
            before
        );
    }

    #[test]
    fn lock_file_is_released_after_write() {
        let temp = TempDir::new().expect("tempdir should create");
        let updater = updater(&temp);
        updater
            .add_or_update_on(RegistryEntry::new("a", "a.py", "a.md"), today())
            .expect("add");
        assert!(!updater.lock_path().exists());
        assert!(updater.lock_path().to_string_lossy().ends_with("index.json.lock"));
    }
}
