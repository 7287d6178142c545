//! Run summary rendering.

use std::fmt::Write as _;

use apicheck_domain::{CheckResult, RunSummary};

use crate::serialization::{SerializationError, to_json_stable};

/// Output format of the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One line per check, failure details indented below.
    #[default]
    Text,
    /// The whole `RunSummary` as pretty JSON.
    Json,
}

impl ReportFormat {
    /// Renders the summary in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(self, summary: &RunSummary) -> Result<String, SerializationError> {
        match self {
            Self::Text => Ok(render_text(summary)),
            Self::Json => render_json(summary),
        }
    }
}

/// Renders the human-readable summary.
#[must_use]
pub fn render_text(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "suite {} (run {})", summary.suite_name, summary.run_id);
    for result in &summary.results {
        write_result(&mut out, result);
    }
    let _ = writeln!(
        out,
        "{} checks: {} passed, {} failed ({:.1}%) in {}ms",
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate(),
        summary.duration_ms
    );
    out
}

fn write_result(out: &mut String, result: &CheckResult) {
    let verdict = if result.passed { "PASS" } else { "FAIL" };
    let status = result
        .status
        .map_or_else(|| "---".to_string(), |s| s.to_string());
    let _ = writeln!(
        out,
        "  {verdict}  {}  [{}] {status} {}ms",
        result.name, result.request, result.duration_ms
    );
    for failure in &result.failures {
        let _ = writeln!(out, "        - {failure}");
    }
}

/// Renders the summary as JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(summary: &RunSummary) -> Result<String, SerializationError> {
    to_json_stable(summary)
}
