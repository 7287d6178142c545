//! Run Suite Use Case
//!
//! Drives every batch of a suite through `ExecuteCheck` and collects a
//! `RunSummary`. Checks inside a batch run strictly in order; up to
//! `concurrency` batches are in flight at once. Results are always returned in
//! suite order.

use std::sync::Arc;
use std::time::Instant;

use apicheck_domain::{CheckBatch, CheckResult, CheckSuite, RunSummary};
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::error::{ApplicationError, ApplicationResult};
use crate::execute_check::{ExecuteCheck, elapsed_ms};
use crate::ports::{AssertionEvaluator, Clock, HttpClient};

/// Use case for running a whole suite.
pub struct RunSuite<C: HttpClient, E: AssertionEvaluator, K: Clock> {
    execute: ExecuteCheck<C, E>,
    clock: Arc<K>,
    concurrency: usize,
}

impl<C: HttpClient, E: AssertionEvaluator, K: Clock> RunSuite<C, E, K> {
    /// Creates a sequential runner.
    pub const fn new(execute: ExecuteCheck<C, E>, clock: Arc<K>) -> Self {
        Self {
            execute,
            clock,
            concurrency: 1,
        }
    }

    /// Set how many batches may run at once (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs every check in the suite. Individual failures never abort the run.
    pub async fn run(&self, suite: &CheckSuite) -> RunSummary {
        let started_at = self.clock.now();
        let start = Instant::now();
        info!(
            suite = %suite.name,
            checks = suite.len(),
            batches = suite.batches.len(),
            concurrency = self.concurrency,
            "starting run"
        );

        let mut batches: Vec<(usize, Vec<CheckResult>)> =
            stream::iter(suite.batches.iter().enumerate())
                .map(|(index, batch)| async move { (index, self.run_batch(batch).await) })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        batches.sort_by_key(|(index, _)| *index);

        let results = batches.into_iter().flat_map(|(_, results)| results).collect();
        let summary = RunSummary::new(&suite.name, started_at, results, elapsed_ms(start));
        info!(
            suite = %summary.suite_name,
            passed = summary.passed,
            failed = summary.failed,
            duration_ms = summary.duration_ms,
            "run finished"
        );
        summary
    }

    async fn run_batch(&self, batch: &CheckBatch) -> Vec<CheckResult> {
        debug!(batch = %batch.name, checks = batch.checks.len(), "running batch");
        let mut results = Vec::with_capacity(batch.checks.len());
        for check in &batch.checks {
            results.push(self.execute.execute(check).await);
        }
        results
    }
}

/// Rejects suites that cannot produce a meaningful report.
///
/// # Errors
///
/// Returns `ApplicationError::InvalidSuite` for an empty suite or duplicate check names.
pub fn validate_suite(suite: &CheckSuite) -> ApplicationResult<()> {
    if suite.is_empty() {
        return Err(ApplicationError::InvalidSuite(format!(
            "suite '{}' has no checks",
            suite.name
        )));
    }
    let duplicates = suite.duplicate_names();
    if !duplicates.is_empty() {
        return Err(ApplicationError::InvalidSuite(format!(
            "suite '{}' has duplicate check names: {}",
            suite.name,
            duplicates.join(", ")
        )));
    }
    Ok(())
}
