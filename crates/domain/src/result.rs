//! Check outcomes and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state::CheckPhase;
use crate::testing::AssertionResult;

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckError {
    /// Transport-level failure: refused, timed out, DNS. Never retried.
    #[error("network error: {message}")]
    Network {
        /// Transport error description.
        message: String,
    },

    /// A non-2xx status on a check that does not tolerate error statuses.
    #[error("unexpected status {actual}, expected 2xx{}", body_suffix(.body))]
    UnexpectedStatus {
        /// Status received.
        actual: u16,
        /// Preview of the response body.
        body: String,
    },

    /// One or more assertions did not hold.
    #[error("{failed} of {total} assertion(s) failed")]
    AssertionMismatch {
        /// Failed assertion count.
        failed: usize,
        /// Evaluated assertion count.
        total: usize,
    },

    /// The request spec was rejected before any network call.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Validation error description.
        message: String,
    },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" (body: {body})")
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name.
    pub name: String,
    /// `METHOD /path` of the request.
    pub request: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Status received, if a response arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Categorized failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckError>,
    /// Human-readable failure messages.
    #[serde(default)]
    pub failures: Vec<String>,
    /// Per-assertion results, in evaluation order.
    #[serde(default)]
    pub assertions: Vec<AssertionResult>,
    /// Lifecycle phase the check ended in.
    pub phase: CheckPhase,
    /// Wall time spent on the check in milliseconds.
    pub duration_ms: u64,
}

impl CheckResult {
    /// Builds a result from evaluated assertions.
    #[must_use]
    pub fn from_assertions(
        name: impl Into<String>,
        request: impl Into<String>,
        status: u16,
        assertions: Vec<AssertionResult>,
        duration_ms: u64,
        phase: CheckPhase,
    ) -> Self {
        let failures: Vec<String> = assertions
            .iter()
            .filter_map(AssertionResult::failure_message)
            .collect();
        let error = (!failures.is_empty()).then(|| CheckError::AssertionMismatch {
            failed: failures.len(),
            total: assertions.len(),
        });

        Self {
            name: name.into(),
            request: request.into(),
            passed: failures.is_empty(),
            status: Some(status),
            error,
            failures,
            assertions,
            phase,
            duration_ms,
        }
    }

    /// Builds a failed result for a check that never reached assertion evaluation.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        request: impl Into<String>,
        error: CheckError,
        duration_ms: u64,
        phase: CheckPhase,
    ) -> Self {
        let status = match &error {
            CheckError::UnexpectedStatus { actual, .. } => Some(*actual),
            _ => None,
        };
        Self {
            name: name.into(),
            request: request.into(),
            passed: false,
            status,
            failures: vec![error.to_string()],
            error: Some(error),
            assertions: Vec::new(),
            phase,
            duration_ms,
        }
    }
}

/// Results of running a whole suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Suite that was run.
    pub suite_name: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-check results in suite order.
    pub results: Vec<CheckResult>,
    /// Total number of checks.
    pub total: usize,
    /// Number of passed checks.
    pub passed: usize,
    /// Number of failed checks.
    pub failed: usize,
    /// Execution time in milliseconds.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Create a new summary.
    #[must_use]
    pub fn new(
        suite_name: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<CheckResult>,
        duration_ms: u64,
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        Self {
            run_id: Uuid::now_v7(),
            suite_name: suite_name.into(),
            started_at,
            results,
            total,
            passed,
            failed: total - passed,
            duration_ms,
        }
    }

    /// Check if all checks passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Failed check results.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
