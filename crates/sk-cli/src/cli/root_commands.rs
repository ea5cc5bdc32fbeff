use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand, ValueEnum};

use crate::cli::subcommands::IndexCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Check one skill or every registered skill. Exits non-zero if any is broken.
    Health(HealthArgs),
    /// Registry maintenance.
    Index {
        #[command(subcommand)]
        action: IndexCommands,
    },
    /// Find the best reusable skill for a request. Exits non-zero without a match.
    Match(MatchArgs),
    /// Decide whether to reuse, adapt, or create a skill.
    Strategy(StrategyArgs),
    /// Verify a script's latest execution. Exits non-zero unless every check passes.
    Verify(VerifyArgs),
    /// Print a JSON Schema for registry types.
    Schema(SchemaArgs),
}

/// Arguments for `skl health`.
#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["skill", "all"])))]
pub struct HealthArgs {
    /// Skill to check.
    #[arg(long)]
    pub skill: Option<String>,

    /// Check every registered skill.
    #[arg(long)]
    pub all: bool,

    /// Persist each verdict to the registry.
    #[arg(long)]
    pub record: bool,
}

/// What the caller is looking for; shared by `match` and `strategy`.
#[derive(Clone, Debug, Args)]
pub struct RequirementArgs {
    /// Subject of the request, e.g. obesity or glp-1.
    #[arg(long = "therapeutic-area", visible_alias = "topic", default_value = "")]
    pub therapeutic_area: String,

    /// Data type: trials, fda_drugs, patents, publications.
    #[arg(long)]
    pub data_type: String,

    /// Filters as a JSON object, e.g. '{"phase": "3"}'.
    #[arg(long)]
    pub filters: Option<String>,

    /// Required external services (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub servers: Vec<String>,

    /// The original free-text request.
    #[arg(long)]
    pub query: Option<String>,
}

/// Arguments for `skl match`.
#[derive(Clone, Debug, Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub requirements: RequirementArgs,

    /// Also list every candidate that passed the data-source pre-filter.
    #[arg(long)]
    pub all: bool,
}

/// Arguments for `skl strategy`.
#[derive(Clone, Debug, Args)]
pub struct StrategyArgs {
    /// Name the new or reused skill would have.
    #[arg(long)]
    pub skill: String,

    #[command(flatten)]
    pub requirements: RequirementArgs,
}

/// Arguments for `skl verify`.
#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("shell").required(true).args(["bash_output", "bash_output_file"])))]
#[command(group(
    ArgGroup::new("script_output")
        .required(true)
        .args(["execution_output", "execution_output_file"])
))]
pub struct VerifyArgs {
    /// Raw output of the shell that ran the script.
    #[arg(long)]
    pub bash_output: Option<String>,

    /// Read the shell output from a file.
    #[arg(long)]
    pub bash_output_file: Option<PathBuf>,

    /// The script's own textual output.
    #[arg(long)]
    pub execution_output: Option<String>,

    /// Read the script output from a file.
    #[arg(long)]
    pub execution_output_file: Option<PathBuf>,

    /// Server type: ct_gov, fda, pubmed, uspto, generic.
    #[arg(long, default_value = "generic")]
    pub server_type: String,

    /// Script to probe for standalone execution.
    #[arg(long)]
    pub skill_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    /// The whole registry document.
    #[default]
    Registry,
    /// One registry entry.
    Entry,
    HealthReport,
}

/// Arguments for `skl schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "registry")]
    pub type_name: SchemaType,
}
