//! Registry location and audit settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_root() -> PathBuf {
    PathBuf::from(".claude/skills")
}

fn default_index_file() -> String {
    "index.json".to_string()
}

const fn default_stale_after_days() -> i64 {
    7
}

const fn default_legacy_retention_days() -> i64 {
    30
}

const fn default_lock_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory all entry paths are relative to.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File name of the registry document inside `root`.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Health older than this is reported as stale by `index validate`.
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// Days legacy files are kept after a layout migration.
    #[serde(default = "default_legacy_retention_days")]
    pub legacy_retention_days: i64,

    /// How long a writer waits for the registry lock.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl RegistryConfig {
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    /// Same settings rooted somewhere else.
    #[must_use]
    pub fn with_root(&self, root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..self.clone()
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            index_file: default_index_file(),
            stale_after_days: default_stale_after_days(),
            legacy_retention_days: default_legacy_retention_days(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}
