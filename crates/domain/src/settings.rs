//! Runner settings.
//!
//! Where the checks are sent and how the harness behaves. Values come from
//! defaults, an optional settings file, `APICHECK_*` environment variables and
//! command-line flags, in increasing precedence.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Default target of the built-in suite.
pub const DEFAULT_BASE_URL: &str = "https://reqres.in/api";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Harness settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Base URL every check path is appended to.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of batches in flight at once.
    pub concurrency: usize,
    /// Stop evaluating a check's assertions after its first failure.
    pub stop_on_failure: bool,
    /// Sent as `x-api-key` when set.
    pub api_key: Option<String>,
    /// Sent as `Authorization: Bearer <token>` when set.
    pub bearer_token: Option<String>,
    /// User-Agent header value.
    pub user_agent: String,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: 1,
            stop_on_failure: false,
            api_key: None,
            bearer_token: None,
            user_agent: concat!("apicheck/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl RunnerSettings {
    /// Parses and checks the base URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSettings` unless the base URL is an absolute
    /// http(s) URL without query or fragment.
    pub fn parsed_base_url(&self) -> DomainResult<Url> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| {
            DomainError::InvalidSettings(format!("base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidSettings(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(DomainError::InvalidSettings(format!(
                "base_url '{}' must not carry a query or fragment",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidSettings` describing the first invalid field.
    pub fn validate(&self) -> DomainResult<()> {
        self.parsed_base_url()?;
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidSettings(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(DomainError::InvalidSettings(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The request timeout as a duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Headers sent on every request, credentials included.
    #[must_use]
    pub fn default_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.headers.clone();
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert("x-api-key".to_string(), key.to_string());
        }
        if let Some(token) = self.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert("authorization".to_string(), format!("Bearer {token}"));
        }
        headers
    }
}
