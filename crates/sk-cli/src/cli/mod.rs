use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `skl` binary.
#[derive(Debug, Parser)]
#[command(
    name = "skl",
    version,
    about = "Skillsmith - registry, health, and reuse decisions for generated scripts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json, table, raw
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Quiet mode (errors only in logs, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Registry root (overrides registry.root)
    #[arg(short, long, global = true)]
    pub registry: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: if self.json {
                OutputFormat::Json
            } else {
                self.format
            },
            quiet: self.quiet,
            verbose: self.verbose,
            color: self.color,
            registry: self.registry.clone(),
        }
    }
}
