//! Execute Check Use Case
//!
//! Runs one check: validate the request, issue it once, apply the status
//! tolerance rule, evaluate assertions, and turn every outcome into a
//! `CheckResult`. Nothing here returns an error to the caller.

use std::sync::Arc;
use std::time::Instant;

use apicheck_domain::{
    Assertion, AssertionResult, Check, CheckError, CheckPhase, CheckResult, ResponseRecord,
};
use tracing::{debug, info, trace, warn};

use crate::ports::{AssertionEvaluator, HttpClient};

/// Characters of body kept in an unexpected-status failure.
const BODY_PREVIEW_CHARS: usize = 200;

/// Use case for executing a single check.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(ReqwestHttpClient::from_settings(&settings)?);
/// let use_case = ExecuteCheck::new(client, Arc::new(JsonAssertionEvaluator::new()));
///
/// let check = Check::new("single user", RequestSpec::get("/users/2"))
///     .with_assertion(Assertion::status(200));
/// let result = use_case.execute(&check).await;
/// ```
pub struct ExecuteCheck<C: HttpClient, E: AssertionEvaluator> {
    client: Arc<C>,
    evaluator: Arc<E>,
    stop_on_failure: bool,
}

impl<C: HttpClient, E: AssertionEvaluator> ExecuteCheck<C, E> {
    /// Creates the use case with the given client and evaluator.
    pub const fn new(client: Arc<C>, evaluator: Arc<E>) -> Self {
        Self {
            client,
            evaluator,
            stop_on_failure: false,
        }
    }

    /// Set whether assertion evaluation stops at the first failure.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Executes the check and reports its outcome.
    pub async fn execute(&self, check: &Check) -> CheckResult {
        let start = Instant::now();
        let label = check.request.label();
        let mut phase = CheckPhase::Idle;

        let outcome = self.request(check, &mut phase).await.map(|response| {
            (
                response.status.as_u16(),
                self.evaluate(&check.assertions, &response),
            )
        });
        advance(&check.name, &mut phase, CheckPhase::Reported);

        let duration_ms = elapsed_ms(start);
        let result = match outcome {
            Ok((status, assertions)) => CheckResult::from_assertions(
                &check.name,
                label,
                status,
                assertions,
                duration_ms,
                phase,
            ),
            Err(error) => CheckResult::failed(&check.name, label, error, duration_ms, phase),
        };

        if result.passed {
            info!(
                check = %result.name,
                status = ?result.status,
                duration_ms = result.duration_ms,
                "check passed"
            );
        } else {
            warn!(
                check = %result.name,
                status = ?result.status,
                failures = result.failures.len(),
                "check failed"
            );
        }
        result
    }

    /// Performs the single network call and applies the status tolerance rule.
    async fn request(
        &self,
        check: &Check,
        phase: &mut CheckPhase,
    ) -> Result<ResponseRecord, CheckError> {
        if let Err(error) = check.request.validate() {
            advance(&check.name, phase, CheckPhase::Failed);
            return Err(CheckError::InvalidRequest {
                message: error.to_string(),
            });
        }

        advance(&check.name, phase, CheckPhase::Requesting);
        debug!(check = %check.name, request = %check.request.label(), "sending request");

        match self.client.execute(&check.request).await {
            Err(error) => {
                advance(&check.name, phase, CheckPhase::Failed);
                Err(error.to_check_error())
            }
            Ok(response) => {
                advance(&check.name, phase, CheckPhase::Responded);
                if !check.request.tolerate_error_status && !response.is_success() {
                    return Err(CheckError::UnexpectedStatus {
                        actual: response.status.as_u16(),
                        body: response.body_preview(BODY_PREVIEW_CHARS),
                    });
                }
                Ok(response)
            }
        }
    }

    fn evaluate(&self, assertions: &[Assertion], response: &ResponseRecord) -> Vec<AssertionResult> {
        let mut results = Vec::with_capacity(assertions.len());

        for assertion in assertions {
            let result = self.evaluator.evaluate(assertion, response);
            let failed = !result.passed;
            results.push(result);

            if failed && self.stop_on_failure {
                break;
            }
        }

        results
    }
}

fn advance(check: &str, phase: &mut CheckPhase, next: CheckPhase) {
    match phase.transition(next) {
        Ok(entered) => {
            trace!(check, from = %phase, to = %entered, "phase transition");
            *phase = entered;
        }
        Err(error) => warn!(check, %error, "phase transition rejected"),
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
