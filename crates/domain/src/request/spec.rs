//! Request specification type

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};

/// Everything needed to issue the single request of a check.
///
/// The path is relative to the configured base URL and may carry a query
/// string (`/users?page=2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL
    pub path: String,
    /// Optional JSON object body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    /// When false, a non-2xx response fails the check before any assertion runs.
    #[serde(default)]
    pub tolerate_error_status: bool,
    /// Extra request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            tolerate_error_status: false,
            headers: BTreeMap::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets the body from a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value is not a JSON object.
    pub fn with_json(mut self, body: Value) -> DomainResult<Self> {
        match body {
            Value::Object(map) => {
                self.body = Some(map);
                Ok(self)
            }
            other => Err(DomainError::InvalidBody(format!(
                "body must be a JSON object, got {other}"
            ))),
        }
    }

    /// Accepts non-2xx responses as values to assert on.
    #[must_use]
    pub const fn tolerating_error_status(mut self) -> Self {
        self.tolerate_error_status = true;
        self
    }

    /// Checks that the path is a usable relative URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` for empty paths, absolute URLs,
    /// scheme-relative paths and paths not starting with `/`.
    pub fn validate(&self) -> DomainResult<()> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(DomainError::InvalidPath("path is empty".to_string()));
        }
        if Url::parse(path).is_ok() {
            return Err(DomainError::InvalidPath(format!(
                "'{path}' is an absolute URL; paths are relative to the base URL"
            )));
        }
        if path.starts_with("//") || !path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "'{path}' must start with a single '/'"
            )));
        }
        if path.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidPath(format!(
                "'{path}' contains whitespace"
            )));
        }
        Ok(())
    }

    /// Joins the path onto `base`, keeping any path prefix the base carries.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` if the path fails validation or the
    /// joined URL does not parse.
    pub fn resolve(&self, base: &Url) -> DomainResult<Url> {
        self.validate()?;
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), self.path.trim());
        Url::parse(&joined).map_err(|e| DomainError::InvalidPath(format!("{e}: {joined}")))
    }

    /// Short `METHOD /path` label for logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://reqres.in/api").unwrap()
    }

    #[test]
    fn test_resolve_keeps_base_prefix_and_query() {
        let url = RequestSpec::get("/users?page=2").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "https://reqres.in/api/users?page=2");
    }

    #[test]
    fn test_resolve_with_trailing_slash_base() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let url = RequestSpec::delete("/users/2").resolve(&base).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/users/2");
    }

    #[test]
    fn test_validate_rejects_bad_paths() {
        for path in ["", "users", "https://evil.example/users", "//host/x", "/a b"] {
            let result = RequestSpec::get(path).validate();
            assert!(
                matches!(result, Err(DomainError::InvalidPath(_))),
                "{path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_with_json_requires_object() {
        let spec = RequestSpec::post("/users")
            .with_json(json!({"name": "Ahmad Nasser Ambari", "job": "Developer"}))
            .unwrap();
        assert_eq!(spec.body.unwrap()["job"], json!("Developer"));

        let result = RequestSpec::post("/users").with_json(json!([1, 2]));
        assert!(matches!(result, Err(DomainError::InvalidBody(_))));
    }

    #[test]
    fn test_tolerate_defaults_to_false_when_deserialized() {
        let spec: RequestSpec =
            serde_json::from_value(json!({"method": "GET", "path": "/users/23"})).unwrap();
        assert!(!spec.tolerate_error_status);
        assert!(spec.body.is_none());
        assert_eq!(spec.label(), "GET /users/23");
    }
}
