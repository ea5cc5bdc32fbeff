//! Human-readable renderings of library report types.

use std::fmt::Write as _;

use serde_json::{Value, json};
use sk_core::{HealthReport, HealthStatus, RegistryEntry, StrategyDecision};
use sk_registry::SyncReport;
use sk_verify::{Severity, VerificationReport};

use crate::output::{Report, paint};

#[must_use]
pub fn status_label(status: HealthStatus) -> String {
    paint(&status.as_str().to_uppercase())
}

fn verdict(passed: bool) -> String {
    paint(if passed { "ok" } else { "FAIL" })
}

/// Append `title:` and an indented bullet per item. Nothing when empty.
pub fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {title}:");
    for item in items {
        let _ = writeln!(out, "    - {item}");
    }
}

impl Report for HealthReport {
    fn text(&self) -> String {
        let mut out = format!("{}: {}\n", self.skill, status_label(self.status));
        for (label, passed) in [
            ("files exist", self.checks.exists),
            ("structure valid", self.checks.structure_valid),
            ("syntax valid", self.checks.syntax_valid),
            ("executable", self.checks.executable),
        ] {
            let _ = writeln!(out, "  {label:<16} {}", verdict(passed));
        }
        push_list(&mut out, "issues", &self.issues);
        push_list(&mut out, "recommendations", &self.recommendations);
        out.trim_end().to_string()
    }
}

impl Report for StrategyDecision {
    fn text(&self) -> String {
        let mut out = format!("Strategy: {}\n", self.strategy);
        if let Some(target) = &self.target_entry {
            let _ = writeln!(out, "Target: {target}");
        }
        if let Some(reference) = &self.reference_entry {
            let _ = writeln!(out, "Reference: {reference}");
        }
        if let Some(status) = self.health_status {
            let _ = writeln!(out, "Health: {}", status_label(status));
        }
        if let Some(score) = self.match_score {
            let _ = writeln!(out, "Match score: {score}");
        }
        let _ = writeln!(out, "Reason: {}", self.reason);
        out.push_str("Action plan:\n");
        for (step, action) in self.action_plan.iter().enumerate() {
            let _ = writeln!(out, "  {}. {action}", step + 1);
        }
        out.trim_end().to_string()
    }
}

impl Report for VerificationReport {
    fn text(&self) -> String {
        let headline = if self.all_passed { "PASSED" } else { "FAILED" };
        let mut out = format!(
            "Verification {} ({}, {} records)\n",
            paint(headline),
            self.server_type,
            self.record_count
        );
        for (name, outcome) in self.checks.iter() {
            let state = match (outcome.passed, outcome.severity) {
                (true, _) => "pass",
                (false, Severity::Warning) => "warn",
                (false, Severity::Error) => "fail",
            };
            let mut lines = outcome.message.lines();
            let first = lines.next().unwrap_or_default();
            let _ = writeln!(out, "  {name:<15} {:<4} {first}", paint(state));
            for line in lines {
                let _ = writeln!(out, "  {:<20} {line}", "");
            }
        }
        out.trim_end().to_string()
    }

    fn table_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Array(
            self.checks
                .iter()
                .into_iter()
                .map(|(name, outcome)| {
                    json!({
                        "check": name,
                        "passed": outcome.passed,
                        "severity": outcome.severity,
                        "message": outcome.message,
                    })
                })
                .collect(),
        ))
    }
}

impl Report for SyncReport {
    fn text(&self) -> String {
        let state = if self.is_clean() { "clean" } else { "drift found" };
        let mut out = format!(
            "Registry audit: {} ({} entries)\n",
            paint(state),
            self.total_entries
        );

        let missing: Vec<String> = self
            .missing_files
            .iter()
            .map(|missing| format!("{}: {}", missing.name, missing.paths.join(", ")))
            .collect();
        let stale: Vec<String> = self
            .stale_health
            .iter()
            .map(|stale| format!("{} (checked {} days ago)", stale.name, stale.age_days))
            .collect();

        push_list(&mut out, "missing files", &missing);
        push_list(&mut out, "unregistered scripts", &self.unregistered_scripts);
        push_list(&mut out, "stale health", &stale);
        push_list(&mut out, "never checked", &self.never_checked);
        push_list(&mut out, "legacy files due for removal", &self.legacy_due);
        push_list(&mut out, "marked broken", &self.marked_broken);
        out.trim_end().to_string()
    }
}

impl Report for RegistryEntry {
    fn text(&self) -> String {
        let mut out = format!("{} ({})\n", self.name, paint(self.storage_layout.as_str()));
        let _ = writeln!(out, "  script: {}", self.script_path);
        let _ = writeln!(out, "  doc:    {}", self.doc_path);
        if !self.description.is_empty() {
            let _ = writeln!(out, "  description: {}", self.description);
        }
        if !self.data_sources.is_empty() {
            let sources: Vec<&str> = self.data_sources.iter().map(String::as_str).collect();
            let _ = writeln!(out, "  data sources: {}", sources.join(", "));
        }
        if !self.patterns.is_empty() {
            let patterns: Vec<&str> = self.patterns.iter().map(String::as_str).collect();
            let _ = writeln!(out, "  patterns: {}", patterns.join(", "));
        }
        let _ = writeln!(out, "  complexity: {}", self.complexity);
        if let Some(date) = self.legacy_removal_date {
            let _ = writeln!(
                out,
                "  legacy files removable after {date}: {}",
                self.legacy_files.join(", ")
            );
        }
        match &self.health {
            Some(health) => {
                let _ = writeln!(
                    out,
                    "  health: {} (checked {})",
                    status_label(health.status),
                    health.last_checked.format("%Y-%m-%d %H:%M UTC")
                );
            }
            None => out.push_str("  health: never checked\n"),
        }
        out.trim_end().to_string()
    }
}

fn entry_row(entry: &RegistryEntry) -> Value {
    json!({
        "name": entry.name,
        "layout": entry.storage_layout,
        "category": entry.category,
        "complexity": entry.complexity,
        "data_sources": entry.data_sources,
        "health": entry.health_status().map_or("unknown", HealthStatus::as_str),
    })
}

impl Report for Vec<RegistryEntry> {
    fn text(&self) -> String {
        if self.is_empty() {
            return "No skills registered.".to_string();
        }
        let value = Value::Array(self.iter().map(entry_row).collect());
        super::render_table(value)
    }

    fn table_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Array(self.iter().map(entry_row).collect()))
    }
}
