//! The five post-execution checks.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use sk_config::{RuntimeConfig, ServerProfile, VerifyConfig};
use sk_health::ScopedProcess;
use tracing::{debug, info};

use crate::error::VerifyError;
use crate::report::{CheckOutcome, VerificationChecks, VerificationReport};
use crate::server::ServerType;

const EXCERPT_LINES_BEFORE: usize = 1;
const EXCERPT_LINES_AFTER: usize = 2;
const MAX_EXCERPT_CHARS: usize = 500;

/// Everything the harness inspects after one execution.
#[derive(Debug, Clone, Default)]
pub struct VerificationInput<'a> {
    /// Raw output of the shell that ran the script.
    pub shell_output: &'a str,
    /// The script's own textual output.
    pub execution_output: &'a str,
    pub server_type: ServerType,
    /// Script to probe for standalone execution.
    pub script_path: Option<&'a Path>,
}

#[derive(Debug, Clone, Default)]
struct CompiledServer {
    schema_fields: Vec<Regex>,
    more_pages_markers: Vec<Regex>,
    complete_markers: Vec<Regex>,
    suspicious_counts: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct VerificationHarness {
    error_signatures: Vec<Regex>,
    count_patterns: Vec<Regex>,
    data_markers: Vec<String>,
    servers: BTreeMap<String, CompiledServer>,
    runtime: RuntimeConfig,
}

impl VerificationHarness {
    /// Compile the configured pattern tables.
    pub fn new(config: &VerifyConfig, runtime: RuntimeConfig) -> Result<Self, VerifyError> {
        let servers = config
            .servers
            .iter()
            .map(|(name, profile)| Ok((name.clone(), compile_server(name, profile)?)))
            .collect::<Result<BTreeMap<_, _>, VerifyError>>()?;

        Ok(Self {
            error_signatures: compile_all("error_signatures", &config.error_signatures)?,
            count_patterns: compile_all("count_patterns", &config.count_patterns)?,
            data_markers: config.data_markers.clone(),
            servers,
            runtime,
        })
    }

    /// Run all five checks. Never touches the registry.
    #[must_use]
    pub fn verify(&self, input: &VerificationInput<'_>) -> VerificationReport {
        let execution = self.verify_execution(input.shell_output);
        let (data_retrieved, record_count) = self.check_data_retrieved(input.execution_output);
        let pagination =
            self.verify_pagination(input.execution_output, record_count, input.server_type);
        let schema = self.verify_schema(input.execution_output, input.server_type);
        let standalone = self.verify_standalone(input.script_path);

        let report = VerificationReport::new(
            input.server_type,
            record_count,
            VerificationChecks {
                execution,
                data_retrieved,
                pagination,
                schema,
                standalone,
            },
        );
        info!(
            server = %input.server_type,
            all_passed = report.all_passed,
            records = report.record_count,
            failed = ?report.failed(),
            "verification complete"
        );
        report
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Fail on the first fatal-error signature, quoting the lines around it.
    #[must_use]
    pub fn verify_execution(&self, shell_output: &str) -> CheckOutcome {
        for signature in &self.error_signatures {
            if let Some(found) = signature.find(shell_output) {
                return CheckOutcome::fail(format!(
                    "fatal error '{}' in output:\n{}",
                    found.as_str(),
                    excerpt(shell_output, found.start())
                ));
            }
        }
        CheckOutcome::pass("no fatal error signatures")
    }

    // ------------------------------------------------------------------
    // Data retrieved
    // ------------------------------------------------------------------

    /// `(passed, record_count)`.
    ///
    /// The first positive count from the ordered patterns wins. Without one,
    /// a known data marker still passes with a count of zero.
    #[must_use]
    pub fn verify_data_retrieved(&self, output: &str) -> (bool, u64) {
        let (outcome, count) = self.check_data_retrieved(output);
        (outcome.passed, count)
    }

    fn check_data_retrieved(&self, output: &str) -> (CheckOutcome, u64) {
        if let Some(count) = self.extract_count(output) {
            return (CheckOutcome::pass(format!("retrieved {count} records")), count);
        }

        if let Some(marker) = self
            .data_markers
            .iter()
            .find(|marker| !marker.is_empty() && output.contains(marker.as_str()))
        {
            return (
                CheckOutcome::pass(format!(
                    "no record count printed, but output contains data marker '{marker}'"
                )),
                0,
            );
        }

        (
            CheckOutcome::fail("no record count and no data markers in output"),
            0,
        )
    }

    fn extract_count(&self, output: &str) -> Option<u64> {
        self.count_patterns.iter().find_map(|pattern| {
            pattern.captures_iter(output).find_map(|captures| {
                captures
                    .get(1)
                    .and_then(|digits| digits.as_str().replace(',', "").parse::<u64>().ok())
                    .filter(|count| *count > 0)
            })
        })
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Warning-level failure when the output looks truncated.
    #[must_use]
    pub fn verify_pagination(
        &self,
        output: &str,
        record_count: u64,
        server_type: ServerType,
    ) -> CheckOutcome {
        let server = self.server(server_type);

        if let Some(found) = first_match(&server.more_pages_markers, output) {
            return CheckOutcome::warn(format!(
                "unconsumed next-page marker '{found}'; results may be truncated"
            ));
        }
        if let Some(found) = first_match(&server.complete_markers, output) {
            return CheckOutcome::pass(format!("pagination complete ('{found}')"));
        }
        if server.suspicious_counts.contains(&record_count) {
            return CheckOutcome::warn(format!(
                "record count {record_count} equals a {server_type} page size; results may be truncated"
            ));
        }
        CheckOutcome::pass("no truncation signals")
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    #[must_use]
    pub fn verify_schema(&self, output: &str, server_type: ServerType) -> CheckOutcome {
        let server = self.server(server_type);
        if server.schema_fields.is_empty() {
            return CheckOutcome::pass(format!("no schema expectations for {server_type}"));
        }

        let missing: Vec<&str> = server
            .schema_fields
            .iter()
            .filter(|field| !field.is_match(output))
            .map(Regex::as_str)
            .collect();
        if missing.is_empty() {
            CheckOutcome::pass(format!(
                "{} expected {server_type} field(s) present",
                server.schema_fields.len()
            ))
        } else {
            CheckOutcome::fail(format!(
                "missing expected {server_type} field(s): {}",
                missing.join(", ")
            ))
        }
    }

    // ------------------------------------------------------------------
    // Standalone
    // ------------------------------------------------------------------

    /// Entry point present and a direct run exits zero within the run timeout.
    /// Skipped (passing) when no path is supplied.
    #[must_use]
    pub fn verify_standalone(&self, script_path: Option<&Path>) -> CheckOutcome {
        let Some(script) = script_path else {
            return CheckOutcome::pass("no script path supplied; skipped");
        };

        let content = match std::fs::read_to_string(script) {
            Ok(content) => content,
            Err(error) => {
                return CheckOutcome::fail(format!("cannot read {}: {error}", script.display()));
            }
        };
        let marker = self.runtime.entry_point_marker.trim();
        if !marker.is_empty() && !content.contains(marker) {
            return CheckOutcome::fail(format!("no entry point ('{marker}') in {}", script.display()));
        }

        let script = std::path::absolute(script).unwrap_or_else(|_| script.to_path_buf());
        let timeout = self.runtime.run_timeout();
        let mut process = ScopedProcess::new(self.runtime.program.clone(), timeout)
            .args(RuntimeConfig::expand(&self.runtime.run_args, &script));
        if let Some(dir) = script.parent() {
            process = process.current_dir(dir);
        }

        match process.run() {
            Ok(outcome) if outcome.success() => {
                debug!(script = %script.display(), "standalone run passed");
                CheckOutcome::pass(format!(
                    "ran standalone in {:.1}s",
                    outcome.elapsed.as_secs_f64()
                ))
            }
            Ok(outcome) => CheckOutcome::fail(format!(
                "standalone run failed: {}",
                outcome.diagnostic(timeout)
            )),
            Err(error) => CheckOutcome::fail(format!("standalone run failed: {error}")),
        }
    }

    fn server(&self, server_type: ServerType) -> CompiledServer {
        self.servers
            .get(server_type.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

fn compile_all(table: &str, patterns: &[String]) -> Result<Vec<Regex>, VerifyError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| VerifyError::InvalidPattern {
                table: table.to_string(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn compile_server(name: &str, profile: &ServerProfile) -> Result<CompiledServer, VerifyError> {
    Ok(CompiledServer {
        schema_fields: compile_all(&format!("servers.{name}.schema_fields"), &profile.schema_fields)?,
        more_pages_markers: compile_all(
            &format!("servers.{name}.more_pages_markers"),
            &profile.more_pages_markers,
        )?,
        complete_markers: compile_all(
            &format!("servers.{name}.complete_markers"),
            &profile.complete_markers,
        )?,
        suspicious_counts: profile.suspicious_counts.clone(),
    })
}

fn first_match<'a>(patterns: &[Regex], output: &'a str) -> Option<&'a str> {
    patterns
        .iter()
        .find_map(|pattern| pattern.find(output))
        .map(|found| found.as_str())
}

/// The line containing byte `offset`, with a little context either side.
fn excerpt(text: &str, offset: usize) -> String {
    let line_index = text[..offset].matches('\n').count();
    let lines: Vec<&str> = text.lines().collect();
    let start = line_index.saturating_sub(EXCERPT_LINES_BEFORE);
    let end = (line_index + EXCERPT_LINES_AFTER + 1).min(lines.len());
    let joined = lines
        .get(start..end)
        .map(|window| window.join("\n"))
        .unwrap_or_default();
    let joined = joined.trim();

    match joined.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((index, _)) => format!("{}...", &joined[..index]),
        None => joined.to_string(),
    }
}
