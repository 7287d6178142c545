//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It owns the base URL, timeout and default headers for a run.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::future::Future;
use std::time::Instant;

use apicheck_application::{HttpClient, HttpClientError};
use apicheck_domain::{HttpMethod, RequestSpec, ResponseRecord, RunnerSettings};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
///
/// Wraps a single `reqwest::Client`, so connections are kept alive across
/// checks. Every call is one attempt with no retry.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a client from runner settings.
    ///
    /// Configuration applied:
    /// - Base URL, timeout and User-Agent from the settings
    /// - Default headers, including `x-api-key` / `Authorization` credentials
    /// - Follow redirects: up to 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or a header is invalid, or the client
    /// cannot be created.
    pub fn from_settings(settings: &RunnerSettings) -> Result<Self, HttpClientError> {
        let base_url = settings
            .parsed_base_url()
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(Self::header_map(&settings.default_headers())?)
            .timeout(settings.timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout_ms: settings.timeout_ms,
        })
    }

    /// The base URL request paths are joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Validates header names and values up front so bad input is a request error.
    fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpClientError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpClientError::InvalidHeader(format!("'{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| HttpClientError::InvalidHeader(format!("value of '{name}': {e}")))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// The error message with its whole source chain, so the cause is visible.
    fn error_chain(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = Self::error_chain(error);
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        if error.is_builder() {
            return HttpClientError::InvalidBody(Self::error_chain(error));
        }

        HttpClientError::Other(Self::error_chain(error))
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<ResponseRecord, HttpClientError>> + Send {
        // Resolve everything borrowed from the request before the async block
        let target = request
            .resolve(&self.base_url)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()));
        let headers = Self::header_map(&request.headers);
        let method = request.method;
        let body = request.body.clone();

        async move {
            let url = target?;
            let headers = headers?;
            debug!(%method, %url, "dispatching request");

            let start = Instant::now();
            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url)
                .headers(headers);
            if let Some(body) = &body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    HttpClientError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    HttpClientError::Other(format!("Failed to read body: {e}"))
                }
            })?;

            let duration = start.elapsed();
            debug!(%method, status, elapsed = ?duration, "response received");

            Ok(ResponseRecord::new(
                status,
                response_headers,
                &body_bytes,
                duration,
            ))
        }
    }
}
