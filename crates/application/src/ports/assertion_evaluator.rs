//! Assertion evaluator port

use apicheck_domain::{Assertion, AssertionResult, ResponseRecord};

/// Port for evaluating one assertion against a response.
///
/// Evaluation never fails as a call: a malformed path or pattern is reported
/// as a failed `AssertionResult`.
pub trait AssertionEvaluator: Send + Sync {
    /// Evaluates `assertion` against `response`.
    fn evaluate(&self, assertion: &Assertion, response: &ResponseRecord) -> AssertionResult;
}
