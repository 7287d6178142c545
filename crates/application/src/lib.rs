//! apicheck Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP client, assertion evaluator, clock)
//! - The `ExecuteCheck` and `RunSuite` use cases
//! - Application-level error handling

pub mod error;
pub mod execute_check;
pub mod ports;
pub mod run_suite;

pub use error::{ApplicationError, ApplicationResult};
pub use execute_check::ExecuteCheck;
pub use ports::{AssertionEvaluator, Clock, HttpClient, HttpClientError};
pub use run_suite::{RunSuite, validate_suite};
