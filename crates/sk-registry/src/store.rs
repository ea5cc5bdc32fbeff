//! Registry document persistence.
//!
//! Reads are whole-document parses. Writes re-serialize the whole document
//! and land atomically:
//! 1. Serialize and re-parse to validate
//! 2. Write to a PID-suffixed temp file next to the target
//! 3. fsync
//! 4. Rename over the target

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sk_config::RegistryConfig;
use tracing::debug;

use crate::document::RegistryDocument;
use crate::error::RegistryError;

#[derive(Debug, Clone)]
pub struct RegistryStore {
    root: PathBuf,
    index_path: PathBuf,
}

impl RegistryStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, index_file: &str) -> Self {
        let root = root.into();
        let index_path = root.join(index_file);
        Self { root, index_path }
    }

    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(config.root.clone(), &config.index_file)
    }

    /// Directory every entry path is relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.index_path.is_file()
    }

    /// Parse the registry document.
    ///
    /// A missing file is [`RegistryError::Missing`]; an unparseable one, a
    /// missing `skills` list, or a duplicated name is [`RegistryError::Corrupt`].
    /// There is no silent empty-registry fallback.
    pub fn load(&self) -> Result<RegistryDocument, RegistryError> {
        if !self.exists() {
            return Err(RegistryError::Missing(self.index_path.clone()));
        }
        let content = fs::read_to_string(&self.index_path)
            .map_err(|error| RegistryError::io(&self.index_path, error))?;
        self.parse(&content)
    }

    /// Like [`Self::load`], but a registry that was never written starts empty.
    /// Writers use this so the first `add` can create the document.
    pub(crate) fn load_or_empty(&self) -> Result<RegistryDocument, RegistryError> {
        match self.load() {
            Err(RegistryError::Missing(_)) => Ok(RegistryDocument::default()),
            other => other,
        }
    }

    fn parse(&self, content: &str) -> Result<RegistryDocument, RegistryError> {
        let document: RegistryDocument =
            serde_json::from_str(content).map_err(|error| self.corrupt(error.to_string()))?;

        if let Some(name) = document.duplicate_name() {
            return Err(self.corrupt(format!("duplicate skill name '{name}'")));
        }
        for entry in &document.skills {
            entry
                .validate()
                .map_err(|error| self.corrupt(error.to_string()))?;
        }

        Ok(document)
    }

    fn corrupt(&self, reason: String) -> RegistryError {
        RegistryError::Corrupt {
            path: self.index_path.clone(),
            reason,
        }
    }

    /// Stamp, re-count, and atomically write the whole document.
    pub(crate) fn save(
        &self,
        document: &mut RegistryDocument,
        today: NaiveDate,
    ) -> Result<(), RegistryError> {
        document.last_updated = today.format("%Y-%m-%d").to_string();
        document.refresh_migration_status();

        let serialized = serde_json::to_string_pretty(document)
            .map_err(|error| self.corrupt(format!("failed to serialize: {error}")))?;
        serde_json::from_str::<serde_json::Value>(&serialized)
            .map_err(|error| self.corrupt(format!("serialized JSON does not re-parse: {error}")))?;

        fs::create_dir_all(&self.root).map_err(|error| RegistryError::io(&self.root, error))?;

        let temp_path = self
            .index_path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|error| RegistryError::io(&temp_path, error))?;
            file.write_all(serialized.as_bytes())
                .and_then(|()| file.write_all(b"\n"))
                .and_then(|()| file.sync_all())
                .map_err(|error| RegistryError::io(&temp_path, error))?;
        }

        if let Err(error) = fs::rename(&temp_path, &self.index_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(RegistryError::io(&self.index_path, error));
        }

        debug!(
            path = %self.index_path.display(),
            skills = document.skills.len(),
            "registry saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sk_core::RegistryEntry;
    use tempfile::TempDir;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 4).unwrap()
    }

    #[test]
    fn missing_file_is_reported_not_defaulted() {
        let temp = TempDir::new().expect("tempdir should create");
        let store = RegistryStore::new(temp.path(), "index.json");
        assert!(matches!(store.load(), Err(RegistryError::Missing(_))));
        assert!(store.load_or_empty().expect("empty").skills.is_empty());
    }

    #[test]
    fn garbage_is_corrupt() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join("index.json"), "{not json").unwrap();
        let store = RegistryStore::new(temp.path(), "index.json");
        assert!(matches!(store.load(), Err(RegistryError::Corrupt { .. })));
        assert!(matches!(
            store.load_or_empty(),
            Err(RegistryError::Corrupt { .. })
        ));
    }

    #[test]
    fn missing_skills_list_is_corrupt() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join("index.json"), r#"{"last_updated":"x"}"#).unwrap();
        let store = RegistryStore::new(temp.path(), "index.json");
        let err = store.load().expect_err("should be corrupt");
        assert!(err.to_string().contains("skills"));
    }

    #[test]
    fn escaping_entry_path_is_corrupt() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(
            temp.path().join("index.json"),
            r#"{"skills":[{"name":"x","script_path":"../x.py","doc_path":"x.md"}]}"#,
        )
        .unwrap();
        let store = RegistryStore::new(temp.path(), "index.json");
        assert!(matches!(store.load(), Err(RegistryError::Corrupt { .. })));
    }

    #[test]
    fn save_stamps_date_and_counts() {
        let temp = TempDir::new().expect("tempdir should create");
        let store = RegistryStore::new(temp.path().join("skills"), "index.json");
        let mut document = RegistryDocument {
            skills: vec![RegistryEntry::new("a", "a.py", "a.md")],
            ..RegistryDocument::default()
        };

        store.save(&mut document, today()).expect("save should succeed");

        let loaded = store.load().expect("load should succeed");
        assert_eq!(loaded.last_updated, "2025-11-04");
        assert_eq!(loaded.migration_status.total_skills, 1);
        assert_eq!(loaded.migration_status.legacy_flat, 1);
        assert_eq!(loaded.skills, document.skills);
        let leftovers = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
