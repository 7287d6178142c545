//! apicheck Domain - Core contract-check types
//!
//! This crate defines the domain model for the apicheck contract runner:
//! requests, responses, assertions, checks and their results.
//! All types here are pure Rust with no I/O dependencies.

pub mod check;
pub mod error;
pub mod request;
pub mod response;
pub mod result;
pub mod settings;
pub mod state;
pub mod testing;

pub use check::{Check, CheckBatch, CheckSuite};
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, RequestSpec};
pub use response::{ResponseBody, ResponseRecord, StatusCode};
pub use result::{CheckError, CheckResult, RunSummary};
pub use settings::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, RunnerSettings};
pub use state::CheckPhase;
pub use testing::{
    Assertion, AssertionResult, ComparisonOperator, ROOT_PATH, StatusExpectation,
};
