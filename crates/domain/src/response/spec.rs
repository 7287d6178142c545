//! Response record type
//!
//! Contains types for representing the response a check received:
//! status code, headers, parsed body and timing information.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Parsed response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
    /// No bytes, or only whitespace.
    Empty,
    /// A JSON document.
    Json(Value),
    /// Bytes that are not JSON, kept as text for diagnostics.
    Text(String),
}

impl ResponseBody {
    /// Classifies raw body text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        serde_json::from_str(text).map_or_else(|_| Self::Text(text.to_string()), Self::Json)
    }

    /// The body as a JSON value: `null` when empty, a string when not JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

/// The response a single check received.
///
/// Owned by the check that produced it and dropped once its assertions ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers keyed by lower-cased name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Parsed body.
    pub body: ResponseBody,
    /// Body exactly as received.
    #[serde(default)]
    pub raw_body: String,
    /// Response time.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ResponseRecord {
    /// Creates a record from raw response data.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: impl IntoIterator<Item = (String, String)>,
        body: &[u8],
        duration: Duration,
    ) -> Self {
        let raw_body = String::from_utf8_lossy(body).into_owned();
        Self {
            status: status.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
            body: ResponseBody::parse(&raw_body),
            raw_body,
            duration,
        }
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The first `max` characters of the raw body, for failure messages.
    #[must_use]
    pub fn body_preview(&self, max: usize) -> String {
        let mut chars = self.raw_body.chars();
        let preview: String = chars.by_ref().take(max).collect();
        if chars.next().is_some() {
            format!("{preview}...")
        } else {
            preview
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
