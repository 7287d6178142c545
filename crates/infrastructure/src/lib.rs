//! apicheck Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus suite, settings and report I/O.

pub mod adapters;
pub mod catalog;
pub mod report;
pub mod serialization;
pub mod settings;
pub mod testing;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use catalog::{CatalogError, SuiteFormat, builtin_suite, load_suite, parse_suite};
pub use report::{ReportFormat, render_json, render_text};
pub use serialization::{SerializationError, from_json, to_json_stable};
pub use settings::{ENV_PREFIX, SettingsError, load_settings};
pub use testing::{JsonAssertionEvaluator, query_json_path};
