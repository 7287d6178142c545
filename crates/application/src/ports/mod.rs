//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait implemented by an adapter in the infrastructure layer.

mod assertion_evaluator;
mod clock;
mod http_client;

pub use assertion_evaluator::AssertionEvaluator;
pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError};
