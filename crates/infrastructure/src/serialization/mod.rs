//! Deterministic JSON for reports and suite documents.
//!
//! Output uses 2-space indentation and ends with a newline, so saved
//! summaries diff cleanly between runs.

mod json;

pub use json::*;
