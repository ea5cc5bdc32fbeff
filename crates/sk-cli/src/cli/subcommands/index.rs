use clap::Subcommand;

/// Registry maintenance. Every mutating action goes through the registry updater.
#[derive(Clone, Debug, Subcommand)]
pub enum IndexCommands {
    /// Register a skill, or update the entry with the same name.
    Add {
        #[arg(long)]
        name: String,
        /// Structured-folder directory relative to the registry root.
        /// Omit to register a legacy flat skill.
        #[arg(long)]
        folder: Option<String>,
        /// Script file name (defaults to <name>.<ext>).
        #[arg(long)]
        script: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Trigger phrases (comma-separated).
        #[arg(long, value_delimiter = ',')]
        triggers: Vec<String>,
        /// External services the script calls (comma-separated).
        #[arg(long, value_delimiter = ',')]
        servers: Vec<String>,
        /// Techniques the script demonstrates, e.g. pagination (comma-separated).
        #[arg(long, value_delimiter = ',')]
        patterns: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        /// Complexity: simple, medium, complex.
        #[arg(long)]
        complexity: Option<String>,
    },
    /// Record a health verdict for a skill.
    Health {
        #[arg(long)]
        skill: String,
        /// Status: healthy, degraded, broken.
        #[arg(long)]
        status: String,
        #[arg(long, num_args = 1..)]
        issues: Vec<String>,
    },
    /// Read-only consistency audit against the filesystem.
    Validate,
    /// Audit and mark entries with vanished files as broken.
    Sync,
    /// List registered skills.
    List {
        /// Only entries whose recorded health has this status.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Record a storage layout migration.
    Migrate {
        #[arg(long)]
        skill: String,
        /// Target layout: structured_folder or legacy_flat.
        #[arg(long, default_value = "structured_folder")]
        layout: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::IndexCommands;
    use crate::cli::{Cli, Commands};

    fn parse_index(args: &[&str]) -> IndexCommands {
        let mut argv = vec!["skl", "index"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).expect("cli should parse");
        let Commands::Index { action } = cli.command else {
            panic!("expected index command");
        };
        action
    }

    #[test]
    fn add_splits_comma_lists() {
        let action = parse_index(&[
            "add",
            "--name",
            "get_glp1_trials",
            "--folder",
            "get-glp1-trials",
            "--servers",
            "ct_gov_mcp",
            "--patterns",
            "pagination,multi-filter",
            "--complexity",
            "medium",
        ]);
        let IndexCommands::Add {
            name,
            folder,
            patterns,
            complexity,
            triggers,
            ..
        } = action
        else {
            panic!("expected add");
        };
        assert_eq!(name, "get_glp1_trials");
        assert_eq!(folder.as_deref(), Some("get-glp1-trials"));
        assert_eq!(patterns, vec!["pagination", "multi-filter"]);
        assert_eq!(complexity.as_deref(), Some("medium"));
        assert!(triggers.is_empty());
    }

    #[test]
    fn health_accepts_several_issues() {
        let action = parse_index(&[
            "health",
            "--skill",
            "a",
            "--status",
            "degraded",
            "--issues",
            "import failed: no module named requests",
            "legacy flat layout",
        ]);
        let IndexCommands::Health { issues, status, .. } = action else {
            panic!("expected health");
        };
        assert_eq!(status, "degraded");
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn migrate_defaults_to_structured_folder() {
        let action = parse_index(&["migrate", "--skill", "a"]);
        let IndexCommands::Migrate { layout, .. } = action else {
            panic!("expected migrate");
        };
        assert_eq!(layout, "structured_folder");
    }
}
