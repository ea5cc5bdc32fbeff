use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::bail;
use serde::Serialize;
use serde_json::{Value, json};
use sk_core::{HealthReport, HealthStatus};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HealthArgs;
use crate::context::AppContext;
use crate::output::{Report, output};
use crate::progress::Progress;

/// Verdicts for every registered skill.
#[derive(Debug, Serialize)]
pub struct HealthBatch {
    pub total: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub broken: Vec<String>,
    pub reports: BTreeMap<String, HealthReport>,
}

impl HealthBatch {
    #[must_use]
    pub fn new(reports: BTreeMap<String, HealthReport>) -> Self {
        let count = |status| {
            reports
                .values()
                .filter(|report| report.status == status)
                .count()
        };
        let broken = reports
            .values()
            .filter(|report| report.status == HealthStatus::Broken)
            .map(|report| report.skill.clone())
            .collect();
        Self {
            total: reports.len(),
            healthy: count(HealthStatus::Healthy),
            degraded: count(HealthStatus::Degraded),
            broken,
            reports,
        }
    }
}

impl Report for HealthBatch {
    fn text(&self) -> String {
        if self.total == 0 {
            return "No skills registered.".to_string();
        }
        let mut out = String::new();
        for report in self.reports.values() {
            let _ = writeln!(out, "{}\n", report.text());
        }
        let _ = write!(
            out,
            "{} skills: {} healthy, {} degraded, {} broken",
            self.total,
            self.healthy,
            self.degraded,
            self.broken.len()
        );
        out
    }

    fn table_value(&self) -> anyhow::Result<Value> {
        Ok(Value::Array(
            self.reports
                .values()
                .map(|report| {
                    json!({
                        "skill": report.skill,
                        "status": report.status,
                        "exists": report.checks.exists,
                        "structure": report.checks.structure_valid,
                        "syntax": report.checks.syntax_valid,
                        "executable": report.checks.executable,
                        "issues": report.issues,
                    })
                })
                .collect(),
        ))
    }
}

/// Handle `skl health`.
pub fn handle(args: &HealthArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let checker = ctx.checker();

    if let Some(skill) = &args.skill {
        let entry = ctx.updater.get(skill)?;
        let spinner = Progress::spinner(&format!("checking {skill}"));
        let report = checker.check(&entry);
        spinner.finish_clear();

        if args.record {
            ctx.updater.record_report(&report)?;
        }
        output(&report, flags.format)?;
        if report.status == HealthStatus::Broken {
            bail!("{skill} is broken");
        }
        return Ok(());
    }

    let entries = ctx.updater.entries()?;
    let bar = Progress::bar(entries.len(), "checking skills");
    let reports = checker.batch_health_check_with(&entries, |report| {
        bar.set_message(&report.skill);
        bar.inc(1);
    });
    bar.finish_clear();

    if args.record {
        for report in reports.values() {
            ctx.updater.record_report(report)?;
        }
    }

    let batch = HealthBatch::new(reports);
    output(&batch, flags.format)?;
    if !batch.broken.is_empty() {
        bail!(
            "{} broken skill(s): {}",
            batch.broken.len(),
            batch.broken.join(", ")
        );
    }
    Ok(())
}
