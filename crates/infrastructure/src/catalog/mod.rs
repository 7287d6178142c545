//! Suite catalog.
//!
//! The reqres suite ships embedded in the binary; further suites are read
//! from YAML or JSON documents with the same schema.

use std::path::{Path, PathBuf};

use apicheck_domain::CheckSuite;
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json};

/// The built-in reqres suite document.
const REQRES_SUITE: &str = include_str!("../../suites/reqres.yaml");

/// Error type for suite loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The suite file could not be read.
    #[error("failed to read suite '{}': {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The document is not a valid YAML suite.
    #[error("invalid YAML suite: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is not a valid JSON suite.
    #[error("invalid JSON suite: {0}")]
    Json(#[from] SerializationError),

    /// The suite parsed but fails request validation.
    #[error("invalid suite: {0}")]
    Invalid(String),
}

/// Document format of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML document (`.yaml`, `.yml`).
    Yaml,
    /// JSON document (`.json`).
    Json,
}

impl SuiteFormat {
    /// Picks the format from a file extension; anything but `.json` is YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Returns the built-in reqres suite.
///
/// # Errors
///
/// Returns an error only if the embedded document is malformed.
pub fn builtin_suite() -> Result<CheckSuite, CatalogError> {
    parse_suite(REQRES_SUITE, SuiteFormat::Yaml)
}

/// Parses a suite document and validates every request in it.
///
/// # Errors
///
/// Returns an error if the document does not match the suite schema or a
/// request is invalid.
pub fn parse_suite(text: &str, format: SuiteFormat) -> Result<CheckSuite, CatalogError> {
    let suite: CheckSuite = match format {
        SuiteFormat::Yaml => serde_yaml::from_str(text)?,
        SuiteFormat::Json => from_json(text)?,
    };

    for check in suite.checks() {
        check
            .request
            .validate()
            .map_err(|e| CatalogError::Invalid(format!("check '{}': {e}", check.name)))?;
    }
    Ok(suite)
}

/// Reads and parses a suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_suite(path: &Path) -> Result<CheckSuite, CatalogError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let suite = parse_suite(&text, SuiteFormat::from_path(path))?;
    debug!(path = %path.display(), suite = %suite.name, checks = suite.len(), "suite loaded");
    Ok(suite)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use apicheck_domain::{Assertion, HttpMethod};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_builtin_suite_has_every_check() {
        let suite = builtin_suite().unwrap();
        assert_eq!(suite.name, "reqres");
        assert_eq!(suite.len(), 15);
        assert!(suite.duplicate_names().is_empty());
    }

    #[test]
    fn test_mutations_share_one_batch() {
        let suite = builtin_suite().unwrap();
        let batch = suite
            .batches
            .iter()
            .find(|b| b.name == "user mutations")
            .unwrap();
        let names: Vec<_> = batch.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["create user", "update user", "patch user", "delete user"]
        );
        let methods: Vec<_> = batch.checks.iter().map(|c| c.request.method).collect();
        assert_eq!(
            methods,
            [
                HttpMethod::Post,
                HttpMethod::Put,
                HttpMethod::Patch,
                HttpMethod::Delete
            ]
        );
        assert_eq!(suite.batches.len(), 12);
    }

    #[test]
    fn test_not_found_checks_tolerate_error_status() {
        let suite = builtin_suite().unwrap();
        let tolerant: Vec<_> = suite
            .checks()
            .filter(|c| c.request.tolerate_error_status)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            tolerant,
            [
                "single user not found",
                "single resource not found",
                "register unsuccessful",
                "login unsuccessful",
                "nonexistent resource"
            ]
        );
    }

    #[test]
    fn test_fixture_values_survive_yaml() {
        let suite = builtin_suite().unwrap();
        let resource = suite.checks().find(|c| c.name == "single resource").unwrap();
        assert!(
            resource
                .assertions
                .contains(&Assertion::equals("$.data.color", "#C74375"))
        );
        assert!(
            resource
                .assertions
                .contains(&Assertion::contains("$.data.pantone_value", "17-2031"))
        );
    }

    #[test]
    fn test_parse_json_suite() {
        let json = r#"{
            "name": "smoke",
            "batches": [{
                "name": "ping",
                "checks": [{
                    "name": "ping",
                    "request": {"method": "GET", "path": "/users/2"},
                    "assertions": [{"type": "status_code", "expected": 200}]
                }]
            }]
        }"#;
        let suite = parse_suite(json, SuiteFormat::Json).unwrap();
        assert_eq!(suite.len(), 1);
    }

    #[test]
    fn test_invalid_request_rejected() {
        let yaml = "name: bad\nbatches:\n  - name: b\n    checks:\n      - name: abs\n        request:\n          method: GET\n          path: https://example.com/users\n";
        assert!(matches!(
            parse_suite(yaml, SuiteFormat::Yaml),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let yaml = "name: bad\nbatches:\n  - name: b\n    checks:\n      - name: trace\n        request:\n          method: TRACE\n          path: /users\n";
        assert!(matches!(
            parse_suite(yaml, SuiteFormat::Yaml),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[tokio::test]
    async fn test_load_suite_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(REQRES_SUITE.as_bytes()).unwrap();

        let suite = load_suite(file.path()).await.unwrap();
        assert_eq!(suite.len(), 15);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_suite(&dir.path().join("missing.yaml")).await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SuiteFormat::from_path(Path::new("suite.JSON")),
            SuiteFormat::Json
        );
        assert_eq!(
            SuiteFormat::from_path(Path::new("suite.yml")),
            SuiteFormat::Yaml
        );
    }
}
