use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse `--filters` as a JSON object.
pub fn parse_filters(raw: Option<&str>) -> anyhow::Result<Map<String, Value>> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => anyhow::bail!("invalid filters: expected a JSON object, got {other}"),
        Err(error) => Err(anyhow::anyhow!("invalid filters '{raw}': {error}")),
    }
}

/// Inline text, or the contents of `file` when given.
pub fn inline_or_file(inline: Option<&str>, file: Option<&Path>, field: &str) -> anyhow::Result<String> {
    match (inline, file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {field} from {}", path.display())),
        (Some(text), None) => Ok(text.to_string()),
        (None, None) => anyhow::bail!("missing {field}"),
    }
}
