//! Building a registry entry from caller input plus the on-disk manifest.

use std::path::Path;

use sk_core::{Complexity, RegistryEntry, StorageLayout};

use crate::error::RegistryError;
use crate::layout::{self, SkillPaths};
use crate::manifest::{self, SkillManifest};

/// Caller-supplied fields for `index add`. Anything left empty is filled
/// from the skill's SKILL.md frontmatter when one exists.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub name: String,
    /// Structured-folder directory, relative to the registry root. `None`
    /// registers a legacy flat skill.
    pub folder: Option<String>,
    /// Script file name; defaults to `<name>.<ext>`.
    pub script: Option<String>,
    pub description: Option<String>,
    pub capability_tags: Vec<String>,
    pub data_sources: Vec<String>,
    pub patterns: Vec<String>,
    pub category: Option<String>,
    pub complexity: Option<Complexity>,
}

impl EntryDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Resolve paths, merge in the manifest, and validate.
    ///
    /// `created` and `health` are left unset; the updater owns both.
    pub fn build(&self, root: &Path, extension: &str) -> Result<RegistryEntry, RegistryError> {
        let name = self.name.trim();
        let (storage_layout, paths) = self.resolve_paths(name, extension);

        let doc_file = root.join(&paths.doc_path);
        let manifest = manifest::read_manifest(&doc_file)?;
        let has_manifest = manifest.is_some();
        let manifest = manifest.unwrap_or_default();

        let mut entry = RegistryEntry::new(name, paths.script_path, paths.doc_path);
        entry.storage_layout = storage_layout;
        entry.has_manifest = has_manifest;
        self.merge_metadata(&mut entry, manifest);

        entry.validate()?;
        Ok(entry)
    }

    fn resolve_paths(&self, name: &str, extension: &str) -> (StorageLayout, SkillPaths) {
        let script_file = self
            .script
            .as_deref()
            .map(str::trim)
            .filter(|script| !script.is_empty())
            .map_or_else(|| format!("{name}.{extension}"), str::to_string);

        match self.folder.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(folder) => (
                StorageLayout::StructuredFolder,
                layout::structured_paths(folder, &script_file),
            ),
            None => (
                StorageLayout::LegacyFlat,
                layout::paths_for(StorageLayout::LegacyFlat, name, &script_file),
            ),
        }
    }

    fn merge_metadata(&self, entry: &mut RegistryEntry, manifest: SkillManifest) {
        entry.description = self
            .description
            .clone()
            .filter(|description| !description.trim().is_empty())
            .or(manifest.description)
            .unwrap_or_default();

        entry.capability_tags = if self.capability_tags.is_empty() {
            manifest.triggers
        } else {
            self.capability_tags.clone()
        };

        let sources = if self.data_sources.is_empty() {
            manifest.data_sources
        } else {
            self.data_sources.clone()
        };
        entry.data_sources = clean_set(sources);

        let patterns = if self.patterns.is_empty() {
            manifest.patterns
        } else {
            self.patterns.clone()
        };
        entry.patterns = clean_set(patterns);

        entry.category = self
            .category
            .clone()
            .or(manifest.category)
            .unwrap_or_default();
        entry.complexity = self.complexity.or(manifest.complexity).unwrap_or_default();
    }
}

fn clean_set(values: Vec<String>) -> std::collections::BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn folder_draft_reads_manifest_metadata() {
        let temp = TempDir::new().expect("tempdir should create");
        write(
            temp.path(),
            "get-glp1-trials/SKILL.md",
            "---\ndescription: from manifest\ntriggers: [glp-1 trials]\nmcp_servers: [ct_gov_mcp]\npatterns: [pagination]\ncategory: clinical-trials\n---\n",
        );

        let mut draft = EntryDraft::new("get_glp1_trials");
        draft.folder = Some("get-glp1-trials".into());
        let entry = draft.build(temp.path(), "py").expect("draft should build");

        assert_eq!(entry.storage_layout, StorageLayout::StructuredFolder);
        assert!(entry.has_manifest);
        assert_eq!(entry.script_path, "get-glp1-trials/scripts/get_glp1_trials.py");
        assert_eq!(entry.description, "from manifest");
        assert_eq!(entry.capability_tags, vec!["glp-1 trials"]);
        assert!(entry.data_sources.contains("ct_gov_mcp"));
        assert!(entry.has_pattern("pagination"));
        assert_eq!(entry.category, "clinical-trials");
        assert!(entry.created.is_none());
    }

    #[test]
    fn explicit_fields_win_over_manifest() {
        let temp = TempDir::new().expect("tempdir should create");
        write(
            temp.path(),
            "x/SKILL.md",
            "---\ndescription: manifest\ncategory: a\n---\n",
        );

        let mut draft = EntryDraft::new("x");
        draft.folder = Some("x".into());
        draft.description = Some("cli".into());
        draft.category = Some("b".into());
        let entry = draft.build(temp.path(), "py").expect("draft should build");

        assert_eq!(entry.description, "cli");
        assert_eq!(entry.category, "b");
    }

    #[test]
    fn flat_draft_without_docs_has_no_manifest() {
        let temp = TempDir::new().expect("tempdir should create");
        let entry = EntryDraft::new("get_fda_labels")
            .build(temp.path(), "py")
            .expect("draft should build");

        assert_eq!(entry.storage_layout, StorageLayout::LegacyFlat);
        assert_eq!(entry.script_path, "get_fda_labels.py");
        assert_eq!(entry.doc_path, "get_fda_labels.md");
        assert!(!entry.has_manifest);
    }

    #[test]
    fn empty_name_is_rejected() {
        let temp = TempDir::new().expect("tempdir should create");
        assert!(EntryDraft::new("  ").build(temp.path(), "py").is_err());
    }
}
