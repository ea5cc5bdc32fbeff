//! Health checks for registry entries.
//!
//! Four checks run in order: existence, structure, syntax, executability.
//! Missing files skip the two subprocess checks and a failed syntax check
//! skips the import probe, but a report is always produced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sk_config::RuntimeConfig;
use sk_core::{HealthChecks, HealthReport, RegistryEntry, StorageLayout};
use sk_registry::manifest;
use tracing::{debug, info};

use crate::process::ScopedProcess;

/// Anything that can produce a health verdict for an entry.
///
/// The strategy engine depends on this rather than on [`HealthChecker`]
/// so decisions can be computed against canned verdicts.
pub trait HealthProbe {
    fn probe(&self, entry: &RegistryEntry) -> HealthReport;
}

#[derive(Debug, Clone)]
pub struct HealthChecker {
    root: PathBuf,
    runtime: RuntimeConfig,
}

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl Findings {
    fn issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    fn recommend(&mut self, recommendation: &str) {
        if !self.recommendations.iter().any(|r| r == recommendation) {
            self.recommendations.push(recommendation.to_string());
        }
    }
}

impl HealthChecker {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, runtime: RuntimeConfig) -> Self {
        Self {
            root: root.into(),
            runtime,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check one entry against the filesystem.
    #[must_use]
    pub fn check(&self, entry: &RegistryEntry) -> HealthReport {
        self.check_at(entry, Utc::now())
    }

    #[must_use]
    pub fn check_at(&self, entry: &RegistryEntry, checked_at: DateTime<Utc>) -> HealthReport {
        let mut findings = Findings::default();
        let script = entry.script_file(&self.root);
        let doc = entry.doc_file(&self.root);

        let exists = check_exists(entry, &script, &doc, &mut findings);
        let structure_valid = check_structure(entry, &doc, exists, &mut findings);

        let (syntax_valid, executable) = if exists {
            let syntax_valid = self.check_syntax(&script, &mut findings);
            let executable = syntax_valid && self.check_import(&script, &mut findings);
            (syntax_valid, executable)
        } else {
            (false, false)
        };

        let checks = HealthChecks {
            exists,
            structure_valid,
            syntax_valid,
            executable,
        };
        let report = HealthReport::new(
            entry.name.clone(),
            checks,
            findings.issues,
            findings.recommendations,
            checked_at,
        );
        debug!(skill = %entry.name, status = %report.status, "health checked");
        report
    }

    /// Check every entry sequentially, keyed by skill name.
    #[must_use]
    pub fn batch_health_check(&self, entries: &[RegistryEntry]) -> BTreeMap<String, HealthReport> {
        self.batch_health_check_with(entries, |_| {})
    }

    /// Like [`Self::batch_health_check`], calling `on_report` after each entry.
    pub fn batch_health_check_with(
        &self,
        entries: &[RegistryEntry],
        mut on_report: impl FnMut(&HealthReport),
    ) -> BTreeMap<String, HealthReport> {
        let reports: BTreeMap<String, HealthReport> = entries
            .iter()
            .map(|entry| {
                let report = self.check(entry);
                on_report(&report);
                (entry.name.clone(), report)
            })
            .collect();
        info!(entries = reports.len(), "batch health check complete");
        reports
    }

    // ------------------------------------------------------------------
    // Individual checks
    // ------------------------------------------------------------------

    fn check_syntax(&self, script: &Path, findings: &mut Findings) -> bool {
        let passed = self.run_check(&self.runtime.syntax_args, script, "syntax check", findings);
        if !passed {
            findings.recommend("fix syntax errors and re-run the health check");
        }
        passed
    }

    fn check_import(&self, script: &Path, findings: &mut Findings) -> bool {
        let passed = self.run_check(&self.runtime.import_args, script, "import", findings);
        if !passed {
            findings.recommend("install missing dependencies or fix imports");
        }
        passed
    }

    fn run_check(
        &self,
        args: &[String],
        script: &Path,
        label: &str,
        findings: &mut Findings,
    ) -> bool {
        let timeout = self.runtime.check_timeout();
        let script = std::path::absolute(script).unwrap_or_else(|_| script.to_path_buf());
        let script = script.as_path();
        let mut process = ScopedProcess::new(self.runtime.program.clone(), timeout)
            .args(RuntimeConfig::expand(args, script));
        if let Some(dir) = script.parent() {
            process = process.current_dir(dir);
        }

        match process.run() {
            Ok(outcome) if outcome.success() => true,
            Ok(outcome) => {
                findings.issue(format!("{label} failed: {}", outcome.diagnostic(timeout)));
                false
            }
            Err(error) => {
                findings.issue(format!("{label} failed: {error}"));
                false
            }
        }
    }
}

fn check_exists(
    entry: &RegistryEntry,
    script: &Path,
    doc: &Path,
    findings: &mut Findings,
) -> bool {
    let mut exists = true;
    if !script.is_file() {
        findings.issue(format!("script not found: {}", entry.script_path));
        exists = false;
    }
    if !doc.is_file() {
        findings.issue(format!("documentation not found: {}", entry.doc_path));
        exists = false;
    }
    if !exists {
        findings.recommend("regenerate the skill or restore its files");
    }
    exists
}

fn check_structure(
    entry: &RegistryEntry,
    doc: &Path,
    exists: bool,
    findings: &mut Findings,
) -> bool {
    let mut valid = true;

    if entry.storage_layout != StorageLayout::StructuredFolder {
        findings.issue("legacy flat layout");
        findings.recommend("migrate to folder layout");
        valid = false;
    }

    if !entry.has_manifest {
        findings.issue("documentation has no manifest header");
        findings.recommend("add manifest header");
        valid = false;
    } else if exists {
        match manifest::read_manifest(doc) {
            Ok(Some(_)) => {}
            Ok(None) => {
                findings.issue(format!(
                    "manifest declared but {} has no frontmatter",
                    entry.doc_path
                ));
                findings.recommend("add manifest header");
                valid = false;
            }
            Err(error) => {
                findings.issue(error.to_string());
                findings.recommend("fix the manifest header");
                valid = false;
            }
        }
    }

    valid
}

impl HealthProbe for HealthChecker {
    fn probe(&self, entry: &RegistryEntry) -> HealthReport {
        self.check(entry)
    }
}
