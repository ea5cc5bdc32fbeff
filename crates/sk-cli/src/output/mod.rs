use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod reports;
pub mod table;

/// A command response that can be printed in every output format.
pub trait Report: Serialize {
    /// Human-readable rendering for `--format text`.
    fn text(&self) -> String;

    /// Value rendered by `--format table`. Defaults to the JSON form.
    fn table_value(&self) -> anyhow::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Render a response to a string in the requested format.
pub fn render<T: Report>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(value.text()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(value.table_value()?)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a response in the requested format.
pub fn output<T: Report>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Color a status word when color output is enabled.
#[must_use]
pub fn paint(value: &str) -> String {
    if ui::prefs().color {
        table::colorize_status(value)
    } else {
        value.to_string()
    }
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.color,
    }
}

fn render_table(value: Value) -> String {
    let options = table_options();
    match value {
        Value::Array(items) => render_array_table(&items),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            table::render_entity_table(&headers, &rows, options)
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            table::render_entity_table(&headers, &rows, options)
        }
    }
}

/// Columns follow first-seen key order so row builders control the layout.
fn render_array_table(items: &[Value]) -> String {
    let options = table_options();

    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&headers, &rows, options);
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::{Report, render, table::render_entity_table, value_to_cell};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        name: &'static str,
        score: u32,
    }

    impl Report for Example {
        fn text(&self) -> String {
            format!("{} scored {}", self.name, self.score)
        }
    }

    #[test]
    fn text_render_uses_the_report_text() {
        let value = Example { name: "x", score: 7 };
        let out = render(&value, OutputFormat::Text).expect("text render should work");
        assert_eq!(out, "x scored 7");
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Example { name: "x", score: 7 };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["name"], "x");
        assert_eq!(parsed["score"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = Example { name: "x", score: 7 };
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_for_object_is_tabular() {
        let value = Example { name: "x", score: 7 };
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("name"));
        assert!(out.contains("score"));
    }

    #[test]
    fn string_lists_render_as_comma_separated_cells() {
        assert_eq!(value_to_cell(&json!(["a", "b"])), "a, b");
        assert_eq!(value_to_cell(&json!(null)), "-");
        assert_eq!(value_to_cell(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn table_alignment_handles_mixed_widths() {
        let headers = ["skill", "status", "issues"];
        let rows = vec![
            vec!["a".to_string(), "healthy".to_string(), "-".to_string()],
            vec![
                "get_obesity_trials".to_string(),
                "degraded".to_string(),
                "legacy flat layout".to_string(),
            ],
        ];

        let table = render_entity_table(
            &headers,
            &rows,
            super::table::TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("skill"));
        assert!(lines[1].chars().all(|c| c == '-'));
    }
}
