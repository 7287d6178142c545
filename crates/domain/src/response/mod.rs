//! HTTP Response domain types

mod spec;

pub use spec::{ResponseBody, ResponseRecord, StatusCode};
