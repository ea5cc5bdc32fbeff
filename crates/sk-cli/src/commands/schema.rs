use schemars::schema_for;
use sk_core::{HealthReport, RegistryEntry};
use sk_registry::RegistryDocument;

use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::cli::{GlobalFlags, OutputFormat};

/// Handle `skl schema`. Needs no configuration or registry.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Registry => schema_for!(RegistryDocument),
        SchemaType::Entry => schema_for!(RegistryEntry),
        SchemaType::HealthReport => schema_for!(HealthReport),
    };
    let rendered = if flags.format == OutputFormat::Raw {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };
    println!("{rendered}");
    Ok(())
}
