//! Filesystem layout conventions for skills.
//!
//! ```text
//! legacy_flat        <name>.<ext>
//!                    <name>.md
//! structured_folder  <folder>/SKILL.md
//!                    <folder>/scripts/<name>.<ext>
//! ```

use std::path::Path;

use sk_core::StorageLayout;

/// Documentation file name inside a structured folder.
pub const MANIFEST_FILE: &str = "SKILL.md";
/// Script subdirectory inside a structured folder.
pub const SCRIPTS_DIR: &str = "scripts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillPaths {
    pub script_path: String,
    pub doc_path: String,
}

/// Conventional folder name for a skill: underscores become hyphens.
#[must_use]
pub fn folder_for(name: &str) -> String {
    name.replace('_', "-")
}

#[must_use]
pub fn structured_paths(folder: &str, script_file: &str) -> SkillPaths {
    let folder = folder.trim_end_matches('/');
    SkillPaths {
        script_path: format!("{folder}/{SCRIPTS_DIR}/{script_file}"),
        doc_path: format!("{folder}/{MANIFEST_FILE}"),
    }
}

#[must_use]
pub fn legacy_paths(name: &str, extension: &str) -> SkillPaths {
    SkillPaths {
        script_path: format!("{name}.{extension}"),
        doc_path: format!("{name}.md"),
    }
}

/// Paths for `name` under `layout`, keeping the current script file name.
#[must_use]
pub fn paths_for(layout: StorageLayout, name: &str, current_script: &str) -> SkillPaths {
    let script_file = Path::new(current_script)
        .file_name()
        .map_or_else(|| name.to_string(), |file| file.to_string_lossy().into_owned());
    match layout {
        StorageLayout::StructuredFolder => structured_paths(&folder_for(name), &script_file),
        StorageLayout::LegacyFlat => {
            let stem = Path::new(&script_file)
                .file_stem()
                .map_or_else(|| name.to_string(), |stem| stem.to_string_lossy().into_owned());
            SkillPaths {
                script_path: script_file,
                doc_path: format!("{stem}.md"),
            }
        }
    }
}

/// Normalize a registry-relative path for comparison (`./a//b` -> `a/b`).
#[must_use]
pub fn normalize(path: &str) -> String {
    Path::new(path)
        .components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
