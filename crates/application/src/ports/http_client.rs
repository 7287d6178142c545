//! HTTP Client port

use std::future::Future;

use apicheck_domain::{CheckError, RequestSpec, ResponseRecord};
use thiserror::Error;

/// Errors an HTTP client adapter can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The target URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be encoded.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// No response within the configured timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Host name resolution failed.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Target host.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// Any other connection failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// Anything else, including body read failures.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Returns true for failures that happen before anything is sent.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::InvalidHeader(_) | Self::InvalidBody(_)
        )
    }

    /// Maps the error onto the per-check failure taxonomy.
    #[must_use]
    pub fn to_check_error(&self) -> CheckError {
        if self.is_request_error() {
            CheckError::InvalidRequest {
                message: self.to_string(),
            }
        } else {
            CheckError::Network {
                message: self.to_string(),
            }
        }
    }
}

/// Port for executing the single HTTP request of a check.
///
/// Adapters own the base URL, timeout and default headers; callers pass the
/// relative request only. No retries: one attempt per call.
pub trait HttpClient: Send + Sync {
    /// Executes a request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or the transport fails.
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseRecord, HttpClientError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transport_errors_map_to_network() {
        let error = HttpClientError::Timeout { timeout_ms: 5000 };
        assert_eq!(
            error.to_check_error(),
            CheckError::Network {
                message: "request timed out after 5000ms".to_string()
            }
        );
    }

    #[test]
    fn test_request_errors_map_to_invalid_request() {
        let error = HttpClientError::InvalidUrl("relative URL without a base".to_string());
        assert!(matches!(
            error.to_check_error(),
            CheckError::InvalidRequest { .. }
        ));
    }
}
