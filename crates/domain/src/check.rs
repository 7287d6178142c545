//! Checks, batches and suites.
//!
//! A [`Check`] is one request plus its assertions. Checks that touch the same
//! server-side resource live in one [`CheckBatch`] so they never interleave;
//! a [`CheckSuite`] is the ordered list of batches a run executes.

use serde::{Deserialize, Serialize};

use crate::request::RequestSpec;
use crate::testing::Assertion;

/// One request and the assertions evaluated against its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Display name, unique within a suite.
    pub name: String,
    /// The request to issue.
    pub request: RequestSpec,
    /// Assertions, evaluated in order.
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl Check {
    /// Creates a check with no assertions.
    #[must_use]
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            name: name.into(),
            request,
            assertions: Vec::new(),
        }
    }

    /// Add an assertion (builder pattern).
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Add several assertions (builder pattern).
    #[must_use]
    pub fn with_assertions(mut self, assertions: impl IntoIterator<Item = Assertion>) -> Self {
        self.assertions.extend(assertions);
        self
    }
}

/// Checks that must run sequentially, in order, relative to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckBatch {
    /// Batch name.
    pub name: String,
    /// Checks in execution order.
    pub checks: Vec<Check>,
}

impl CheckBatch {
    /// Creates a batch.
    #[must_use]
    pub fn new(name: impl Into<String>, checks: Vec<Check>) -> Self {
        Self {
            name: name.into(),
            checks,
        }
    }

    /// Wraps a single check in a batch of its own.
    #[must_use]
    pub fn single(check: Check) -> Self {
        Self {
            name: check.name.clone(),
            checks: vec![check],
        }
    }
}

/// The ordered collection of batches a run executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CheckSuite {
    /// Suite name.
    pub name: String,
    /// Batches in report order.
    #[serde(default)]
    pub batches: Vec<CheckBatch>,
}

impl CheckSuite {
    /// Create a new empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Vec::new(),
        }
    }

    /// Add an independent check (builder pattern).
    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.batches.push(CheckBatch::single(check));
        self
    }

    /// Add an ordered batch (builder pattern).
    #[must_use]
    pub fn with_batch(mut self, batch: CheckBatch) -> Self {
        self.batches.push(batch);
        self
    }

    /// All checks in report order.
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.batches.iter().flat_map(|batch| batch.checks.iter())
    }

    /// Get the number of checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.iter().map(|batch| batch.checks.len()).sum()
    }

    /// Check if the suite has no checks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names that appear on more than one check.
    #[must_use]
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        let mut duplicates = Vec::new();
        for check in self.checks() {
            if !seen.insert(check.name.as_str()) && !duplicates.contains(&check.name.as_str()) {
                duplicates.push(check.name.as_str());
            }
        }
        duplicates
    }
}
