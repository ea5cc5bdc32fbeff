use sk_core::{DataType, Requirements};

use crate::cli::root_commands::RequirementArgs;
use crate::commands::shared::parse::{parse_enum, parse_filters};

/// Turn `match` / `strategy` flags into a `Requirements` record.
pub fn from_args(args: &RequirementArgs) -> anyhow::Result<Requirements> {
    let data_type = parse_enum::<DataType>(&args.data_type, "data type")?;
    let mut requirements = Requirements::new(data_type, args.therapeutic_area.trim());
    requirements.filters = parse_filters(args.filters.as_deref())?;
    requirements.servers = args
        .servers
        .iter()
        .map(|server| server.trim())
        .filter(|server| !server.is_empty())
        .map(str::to_string)
        .collect();
    requirements.query = args.query.clone().unwrap_or_default();
    Ok(requirements)
}
