//! Response assertion evaluation.
//!
//! Implements the `AssertionEvaluator` port against parsed JSON bodies.

mod evaluator;
mod json_path;

pub use evaluator::JsonAssertionEvaluator;
pub use json_path::query_json_path;
