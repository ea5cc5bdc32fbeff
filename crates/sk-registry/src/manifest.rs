//! SKILL.md frontmatter parsing.
//!
//! A manifest is the YAML block between the leading `---` delimiters of a
//! skill's documentation file. Keys the registry does not use are ignored.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use sk_core::Complexity;

use crate::error::RegistryError;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SkillManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Trigger phrases; becomes `capability_tags`.
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default, alias = "mcp_servers")]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub complexity: Option<Complexity>,
}

/// The text between an opening `---` line and the next `---` line.
#[must_use]
pub fn extract_frontmatter(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Some(&content[start..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse the manifest of a documentation file's content.
///
/// `Ok(None)` means the document has no frontmatter block.
pub fn parse_manifest(content: &str) -> Result<Option<SkillManifest>, serde_yaml::Error> {
    let Some(block) = extract_frontmatter(content) else {
        return Ok(None);
    };
    if block.trim().is_empty() {
        return Ok(Some(SkillManifest::default()));
    }
    serde_yaml::from_str(block).map(Some)
}

/// Read and parse the manifest at `path`. A missing file has no manifest.
pub fn read_manifest(path: &Path) -> Result<Option<SkillManifest>, RegistryError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|error| RegistryError::io(path, error))?;
    parse_manifest(&content).map_err(|error| RegistryError::Manifest {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SKILL_MD: &str = "---
name: get_glp1_trials
description: GLP-1 agonist trials from ClinicalTrials.gov
triggers:
  - glp-1 trials
  - semaglutide studies
mcp_servers: [ct_gov_mcp]
patterns: [pagination]
category: clinical-trials
complexity: medium
license: internal
---
# GLP-1 trials

Body text.
";

    #[test]
    fn parses_full_frontmatter() {
        let manifest = parse_manifest(SKILL_MD).unwrap().expect("has frontmatter");
        assert_eq!(manifest.name.as_deref(), Some("get_glp1_trials"));
        assert_eq!(manifest.triggers, vec!["glp-1 trials", "semaglutide studies"]);
        assert_eq!(manifest.data_sources, vec!["ct_gov_mcp"]);
        assert_eq!(manifest.complexity, Some(Complexity::Medium));
    }

    #[test]
    fn document_without_frontmatter_has_no_manifest() {
        assert_eq!(parse_manifest("# Title\n\ntext\n").unwrap(), None);
    }

    #[test]
    fn unterminated_frontmatter_is_not_a_manifest() {
        assert_eq!(parse_manifest("---\nname: x\n# no closing line\n").unwrap(), None);
    }

    #[test]
    fn empty_frontmatter_is_an_empty_manifest() {
        assert_eq!(
            parse_manifest("---\n---\nbody\n").unwrap(),
            Some(SkillManifest::default())
        );
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_manifest("---\ntriggers: [unclosed\n---\n").is_err());
    }

    #[test]
    fn missing_file_has_no_manifest() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(read_manifest(&temp.path().join("SKILL.md")).unwrap(), None);
    }
}
