use serde::Serialize;
use sk_core::{Complexity, EntryHealth, HealthStatus, RegistryEntry, StorageLayout};
use sk_registry::{EntryDraft, UpsertOutcome};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::IndexCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::reports::{push_list, status_label};
use crate::output::{Report, output};

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub outcome: UpsertOutcome,
    pub entry: RegistryEntry,
}

impl Report for AddResponse {
    fn text(&self) -> String {
        format!("{} {}\n{}", self.outcome, self.entry.name, self.entry.text())
    }
}

#[derive(Debug, Serialize)]
pub struct HealthRecorded {
    pub skill: String,
    pub health: EntryHealth,
}

impl Report for HealthRecorded {
    fn text(&self) -> String {
        let mut out = format!(
            "recorded {} for {}\n",
            status_label(self.health.status),
            self.skill
        );
        push_list(&mut out, "issues", &self.health.issues);
        out.trim_end().to_string()
    }
}

/// Handle `skl index`.
pub fn handle(action: &IndexCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        IndexCommands::Add {
            name,
            folder,
            script,
            description,
            triggers,
            servers,
            patterns,
            category,
            complexity,
        } => {
            let draft = EntryDraft {
                name: name.clone(),
                folder: folder.clone(),
                script: script.clone(),
                description: description.clone(),
                capability_tags: non_empty(triggers),
                data_sources: non_empty(servers),
                patterns: non_empty(patterns),
                category: category.clone(),
                complexity: complexity
                    .as_deref()
                    .map(|raw| parse_enum::<Complexity>(raw, "complexity"))
                    .transpose()?,
            };
            let (entry, outcome) = ctx.updater.register(&draft)?;
            output(&AddResponse { outcome, entry }, flags.format)
        }
        IndexCommands::Health {
            skill,
            status,
            issues,
        } => {
            let status = parse_enum::<HealthStatus>(status, "status")?;
            let health = ctx.updater.update_health(skill, status, issues.clone())?;
            output(
                &HealthRecorded {
                    skill: skill.clone(),
                    health,
                },
                flags.format,
            )
        }
        IndexCommands::Validate => output(&ctx.updater.validate()?, flags.format),
        IndexCommands::Sync => output(&ctx.updater.validate_and_sync()?, flags.format),
        IndexCommands::List { status, category } => {
            let status = status
                .as_deref()
                .map(|raw| parse_enum::<HealthStatus>(raw, "status"))
                .transpose()?;
            let mut entries = ctx.updater.entries()?;
            entries.retain(|entry| {
                status.is_none_or(|status| entry.health_status() == Some(status))
                    && category
                        .as_deref()
                        .is_none_or(|category| entry.category.eq_ignore_ascii_case(category))
            });
            output(&entries, flags.format)
        }
        IndexCommands::Migrate { skill, layout } => {
            let layout = parse_enum::<StorageLayout>(layout, "layout")?;
            output(&ctx.updater.mark_migrated(skill, layout)?, flags.format)
        }
    }
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::non_empty;

    #[test]
    fn blank_list_items_are_dropped() {
        let values = vec![" pagination ".to_string(), String::new(), "multi-filter".into()];
        assert_eq!(non_empty(&values), vec!["pagination", "multi-filter"]);
    }
}
