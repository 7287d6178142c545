//! Assertion evaluator implementation.
//!
//! Evaluates assertions against a `ResponseRecord` and produces
//! `AssertionResult`s carrying expected vs. actual values.

use apicheck_application::AssertionEvaluator;
use apicheck_domain::{
    Assertion, AssertionResult, ComparisonOperator, ROOT_PATH, ResponseBody, ResponseRecord,
    StatusExpectation,
};
use regex::Regex;
use serde_json::{Number, Value};

use super::json_path::query_json_path;

/// Characters of an actual value kept in a failure.
const PREVIEW_CHARS: usize = 100;

/// Evaluates assertions against JSON response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAssertionEvaluator;

impl JsonAssertionEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn check_status_code(
        assertion: &Assertion,
        response: &ResponseRecord,
        expected: &StatusExpectation,
    ) -> AssertionResult {
        let actual = response.status.as_u16();
        if expected.matches(actual) {
            AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
        } else {
            AssertionResult::mismatch(
                assertion.clone(),
                expected.description(),
                actual.to_string(),
                "status mismatch",
            )
        }
    }

    fn check_has_key(assertion: &Assertion, body: &Value, path: &str) -> AssertionResult {
        match locate(assertion, body, path) {
            Ok(value) => AssertionResult::pass_with_value(assertion.clone(), preview(value)),
            Err(failure) => failure,
        }
    }

    fn check_equals(
        assertion: &Assertion,
        body: &Value,
        path: &str,
        expected: &Value,
    ) -> AssertionResult {
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        if json_equal(value, expected) {
            AssertionResult::pass_with_value(assertion.clone(), preview(value))
        } else {
            AssertionResult::mismatch(
                assertion.clone(),
                expected.to_string(),
                preview(value),
                "value mismatch",
            )
        }
    }

    fn check_contains(
        assertion: &Assertion,
        body: &Value,
        path: &str,
        needle: &Value,
    ) -> AssertionResult {
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let contains = match (value, needle) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::Array(items), Value::Array(sub)) => {
                contains_sequence(items, sub) || items.iter().any(|item| json_equal(item, needle))
            }
            (Value::Array(items), _) => items.iter().any(|item| json_equal(item, needle)),
            (Value::Object(map), Value::Object(subset)) => subset
                .iter()
                .all(|(key, v)| map.get(key).is_some_and(|actual| json_equal(actual, v))),
            _ => false,
        };

        if contains {
            AssertionResult::pass_with_value(assertion.clone(), preview(value))
        } else {
            AssertionResult::mismatch(
                assertion.clone(),
                format!("containing {needle}"),
                preview(value),
                "value not contained",
            )
        }
    }

    fn check_kind(
        assertion: &Assertion,
        body: &Value,
        path: &str,
        kind: &'static str,
        is_kind: fn(&Value) -> bool,
    ) -> AssertionResult {
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        if is_kind(value) {
            AssertionResult::pass_with_value(assertion.clone(), kind)
        } else {
            AssertionResult::mismatch(assertion.clone(), kind, type_name(value), "wrong type")
        }
    }

    fn check_is_empty(
        assertion: &Assertion,
        response: &ResponseRecord,
        body: &Value,
        path: &str,
    ) -> AssertionResult {
        if path.trim() == ROOT_PATH && matches!(response.body, ResponseBody::Empty) {
            return AssertionResult::pass_with_value(assertion.clone(), "no body");
        }
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let empty = match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        if empty {
            AssertionResult::pass_with_value(assertion.clone(), preview(value))
        } else {
            AssertionResult::mismatch(assertion.clone(), "empty", preview(value), "not empty")
        }
    }

    fn check_length(
        assertion: &Assertion,
        body: &Value,
        path: &str,
        operator: ComparisonOperator,
        expected_length: usize,
    ) -> AssertionResult {
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let actual_length = match value {
            Value::Array(items) => items.len(),
            Value::String(s) => s.chars().count(),
            Value::Object(map) => map.len(),
            other => {
                return AssertionResult::mismatch(
                    assertion.clone(),
                    "array, string or object",
                    type_name(other),
                    "value has no length",
                );
            }
        };

        if operator.compare(actual_length, expected_length) {
            AssertionResult::pass_with_value(assertion.clone(), actual_length.to_string())
        } else {
            AssertionResult::mismatch(
                assertion.clone(),
                format!("{} {expected_length}", operator.symbol()),
                actual_length.to_string(),
                "length mismatch",
            )
        }
    }

    fn check_matches(
        assertion: &Assertion,
        body: &Value,
        path: &str,
        pattern: &str,
    ) -> AssertionResult {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                return AssertionResult::fail(
                    assertion.clone(),
                    format!("invalid regex pattern '{pattern}': {e}"),
                );
            }
        };
        let value = match locate(assertion, body, path) {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return AssertionResult::mismatch(
                    assertion.clone(),
                    "string",
                    type_name(other),
                    "value is not text",
                );
            }
        };

        if regex.is_match(&text) {
            AssertionResult::pass_with_value(assertion.clone(), text)
        } else {
            AssertionResult::mismatch(
                assertion.clone(),
                format!("/{pattern}/"),
                truncate(&text),
                "pattern not matched",
            )
        }
    }

    fn check_header_exists(
        assertion: &Assertion,
        response: &ResponseRecord,
        name: &str,
        expected_value: Option<&str>,
    ) -> AssertionResult {
        match (response.header(name), expected_value) {
            (None, _) => {
                AssertionResult::fail(assertion.clone(), format!("header '{name}' not found"))
            }
            (Some(actual), Some(expected)) if actual != expected => AssertionResult::mismatch(
                assertion.clone(),
                expected,
                actual,
                format!("header '{name}' value mismatch"),
            ),
            (Some(actual), _) => AssertionResult::pass_with_value(assertion.clone(), actual),
        }
    }
}

impl AssertionEvaluator for JsonAssertionEvaluator {
    fn evaluate(&self, assertion: &Assertion, response: &ResponseRecord) -> AssertionResult {
        let body = response.body.to_value();
        match assertion {
            Assertion::StatusCode { expected } => {
                Self::check_status_code(assertion, response, expected)
            }
            Assertion::HasKey { path } => Self::check_has_key(assertion, &body, path),
            Assertion::Equals { path, expected } => {
                Self::check_equals(assertion, &body, path, expected)
            }
            Assertion::Contains { path, value } => {
                Self::check_contains(assertion, &body, path, value)
            }
            Assertion::IsArray { path } => {
                Self::check_kind(assertion, &body, path, "array", Value::is_array)
            }
            Assertion::IsObject { path } => {
                Self::check_kind(assertion, &body, path, "object", Value::is_object)
            }
            Assertion::IsEmpty { path } => Self::check_is_empty(assertion, response, &body, path),
            Assertion::Length {
                path,
                operator,
                length,
            } => Self::check_length(assertion, &body, path, *operator, *length),
            Assertion::Matches { path, pattern } => {
                Self::check_matches(assertion, &body, path, pattern)
            }
            Assertion::HeaderExists { name, value } => {
                Self::check_header_exists(assertion, response, name, value.as_deref())
            }
        }
    }
}

/// Resolves `path` in the body or produces the failure to report.
fn locate<'a>(
    assertion: &Assertion,
    body: &'a Value,
    path: &str,
) -> Result<&'a Value, AssertionResult> {
    match query_json_path(body, path) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(AssertionResult::mismatch(
            assertion.clone(),
            format!("{path} present"),
            "missing",
            format!("JSON path '{path}' not found"),
        )),
        Err(e) => Err(AssertionResult::fail(assertion.clone(), e.to_string())),
    }
}

/// Deep equality where numbers compare by value, so `2` equals `2.0`.
fn json_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => actual == expected,
    }
}

/// Integers compare exactly; only a float on either side widens to `f64`.
#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y);
    }
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.as_u64() == b.as_u64(),
        _ => false,
    }
}

/// True when `sub` appears as a contiguous run inside `items`.
fn contains_sequence(items: &[Value], sub: &[Value]) -> bool {
    if sub.is_empty() {
        return true;
    }
    items
        .windows(sub.len())
        .any(|window| window.iter().zip(sub).all(|(a, b)| json_equal(a, b)))
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(value: &Value) -> String {
    truncate(&value.to_string())
}

fn truncate(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
