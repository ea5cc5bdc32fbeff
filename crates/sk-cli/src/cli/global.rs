use std::path::PathBuf;

use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    Json,
    Table,
    /// Single-line JSON.
    Raw,
}

impl OutputFormat {
    #[must_use]
    pub const fn is_human(self) -> bool {
        matches!(self, Self::Text | Self::Table)
    }
}

/// When to emit ANSI colors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub color: ColorMode,
    /// Overrides `registry.root` from configuration.
    pub registry: Option<PathBuf>,
}
