//! Response assertions.
//!
//! Declarative predicates over a [`ResponseRecord`](crate::response::ResponseRecord).
//! Body fields are addressed with a small JSONPath subset: `$`, `$.data.id`,
//! `$.data[0].id`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path addressing the whole body.
pub const ROOT_PATH: &str = "$";

fn root_path() -> String {
    ROOT_PATH.to_string()
}

/// A single assertion to run against a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Check response status code.
    StatusCode {
        /// Expected status code, range, or set.
        expected: StatusExpectation,
    },
    /// Check a body field exists, whatever its value.
    HasKey {
        /// JSON path of the field.
        path: String,
    },
    /// Check a body field deep-equals a value.
    Equals {
        /// JSON path of the field.
        path: String,
        /// Expected value.
        expected: Value,
    },
    /// Check a string field contains a substring, or an array contains an element.
    Contains {
        /// JSON path of the field.
        path: String,
        /// Substring or element to look for.
        value: Value,
    },
    /// Check a body field is an array.
    IsArray {
        /// JSON path of the field.
        path: String,
    },
    /// Check a body field is an object.
    IsObject {
        /// JSON path of the field.
        path: String,
    },
    /// Check a body field (the whole body by default) is empty.
    ///
    /// Empty means no body, `null`, `""`, `{}` or `[]`.
    IsEmpty {
        /// JSON path of the field.
        #[serde(default = "root_path")]
        path: String,
    },
    /// Compare the length of an array, string or object field.
    Length {
        /// JSON path of the field.
        path: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Length to compare against.
        length: usize,
    },
    /// Check a string field matches a regex.
    Matches {
        /// JSON path of the field.
        path: String,
        /// Regex pattern.
        pattern: String,
    },
    /// Check a response header exists and optionally its exact value.
    HeaderExists {
        /// Header name (case-insensitive).
        name: String,
        /// Optional expected value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

impl Assertion {
    /// Status must equal `code`.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusCode {
            expected: StatusExpectation::Exact(code),
        }
    }

    /// Field at `path` must exist.
    #[must_use]
    pub fn has_key(path: impl Into<String>) -> Self {
        Self::HasKey { path: path.into() }
    }

    /// Field at `path` must equal `expected`.
    #[must_use]
    pub fn equals(path: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self::Equals {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Field at `path` must contain `value`.
    #[must_use]
    pub fn contains(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Field at `path` must be an array.
    #[must_use]
    pub fn is_array(path: impl Into<String>) -> Self {
        Self::IsArray { path: path.into() }
    }

    /// The whole body must be empty.
    #[must_use]
    pub fn body_is_empty() -> Self {
        Self::IsEmpty { path: root_path() }
    }

    /// Length of the field at `path` must satisfy `operator length`.
    #[must_use]
    pub fn length(path: impl Into<String>, operator: ComparisonOperator, length: usize) -> Self {
        Self::Length {
            path: path.into(),
            operator,
            length,
        }
    }

    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusCode { expected } => format!("Status code {}", expected.description()),
            Self::HasKey { path } => format!("{path} exists"),
            Self::Equals { path, expected } => format!("{path} equals {expected}"),
            Self::Contains { path, value } => format!("{path} contains {value}"),
            Self::IsArray { path } => format!("{path} is an array"),
            Self::IsObject { path } => format!("{path} is an object"),
            Self::IsEmpty { path } if path == ROOT_PATH => "Body is empty".to_string(),
            Self::IsEmpty { path } => format!("{path} is empty"),
            Self::Length {
                path,
                operator,
                length,
            } => format!("length of {path} {} {length}", operator.symbol()),
            Self::Matches { path, pattern } => format!("{path} matches /{pattern}/"),
            Self::HeaderExists {
                name,
                value: Some(v),
            } => format!("Header '{name}' equals '{v}'"),
            Self::HeaderExists { name, value: None } => format!("Header '{name}' exists"),
        }
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => (*min..=*max).contains(&status),
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Comparison operators for length assertions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    /// Applies the operator as `actual <op> expected`.
    #[must_use]
    pub fn compare(self, actual: usize, expected: usize) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::GreaterThan => actual > expected,
            Self::GreaterThanOrEqual => actual >= expected,
            Self::LessThan => actual < expected,
            Self::LessThanOrEqual => actual <= expected,
        }
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Expected value (for display).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value found (for display).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Error message if failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub const fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            expected: None,
            actual: None,
            error: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            actual: Some(actual.into()),
            ..Self::pass(assertion)
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            expected: None,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result carrying expected and actual values.
    #[must_use]
    pub fn mismatch(
        assertion: Assertion,
        expected: impl Into<String>,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            expected: Some(expected.into()),
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }

    /// One-line failure message: the assertion, the reason, and expected vs. actual.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        if self.passed {
            return None;
        }
        let mut message = self.assertion.description();
        if let Some(error) = &self.error {
            message.push_str(": ");
            message.push_str(error);
        }
        if let (Some(expected), Some(actual)) = (&self.expected, &self.actual) {
            message.push_str(&format!(" (expected {expected}, actual {actual})"));
        }
        Some(message)
    }
}
