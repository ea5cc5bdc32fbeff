//! Verification results.

use serde::Serialize;

use crate::server::ServerType;

/// How a failed check should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    /// Likely but unproven problem, such as suspected truncation.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub severity: Severity,
    pub message: String,
}

impl CheckOutcome {
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// One outcome per check, serialized as a name -> `{passed, message}` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationChecks {
    pub execution: CheckOutcome,
    pub data_retrieved: CheckOutcome,
    pub pagination: CheckOutcome,
    pub schema: CheckOutcome,
    pub standalone: CheckOutcome,
}

impl VerificationChecks {
    /// `(name, outcome)` pairs in evaluation order.
    #[must_use]
    pub fn iter(&self) -> [(&'static str, &CheckOutcome); 5] {
        [
            ("execution", &self.execution),
            ("data_retrieved", &self.data_retrieved),
            ("pagination", &self.pagination),
            ("schema", &self.schema),
            ("standalone", &self.standalone),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub all_passed: bool,
    pub server_type: ServerType,
    pub record_count: u64,
    pub checks: VerificationChecks,
}

impl VerificationReport {
    #[must_use]
    pub fn new(server_type: ServerType, record_count: u64, checks: VerificationChecks) -> Self {
        let all_passed = checks.iter().iter().all(|(_, outcome)| outcome.passed);
        Self {
            all_passed,
            server_type,
            record_count,
            checks,
        }
    }

    /// Names of the checks that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .into_iter()
            .filter(|(_, outcome)| !outcome.passed)
            .map(|(name, _)| name)
            .collect()
    }
}
