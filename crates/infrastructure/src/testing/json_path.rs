//! A small JSONPath subset.
//!
//! Supports `$`, `$.field`, `$.field.nested`, `$.array[0]` and `$.array[*]`
//! (which yields the whole array).

use apicheck_domain::{DomainError, DomainResult};
use serde_json::Value;

/// Looks up `path` in `json`.
///
/// Returns `Ok(None)` when the path is well formed but nothing lives there.
///
/// # Errors
///
/// Returns `DomainError::InvalidJsonPath` when the path does not start with `$`
/// or carries a malformed index.
pub fn query_json_path<'a>(json: &'a Value, path: &str) -> DomainResult<Option<&'a Value>> {
    let trimmed = path.trim();
    let Some(rest) = trimmed.strip_prefix('$') else {
        return Err(invalid(path, "must start with '$'"));
    };
    if rest.is_empty() {
        return Ok(Some(json));
    }
    let Some(rest) = rest.strip_prefix('.').or_else(|| rest.starts_with('[').then_some(rest)) else {
        return Err(invalid(path, "expected '.' or '[' after '$'"));
    };

    let mut current = json;
    for segment in split_path_segments(rest) {
        let (name, index) = parse_array_access(&segment)
            .map_or((segment.as_str(), None), |(name, index)| (name, Some(index)));

        if !name.is_empty() {
            current = match current.get(name) {
                Some(value) => value,
                None => return Ok(None),
            };
        }

        match index {
            None => {}
            Some("*") => {
                if !current.is_array() {
                    return Ok(None);
                }
            }
            Some(index) => {
                let idx: usize = index
                    .parse()
                    .map_err(|_| invalid(path, &format!("invalid array index '{index}'")))?;
                current = match current.get(idx) {
                    Some(value) => value,
                    None => return Ok(None),
                };
            }
        }
    }

    Ok(Some(current))
}

fn invalid(path: &str, reason: &str) -> DomainError {
    DomainError::InvalidJsonPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a path into segments, respecting array brackets.
fn split_path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Parse array access like "field[0]" into ("field", "0").
fn parse_array_access(segment: &str) -> Option<(&str, &str)> {
    let bracket_start = segment.find('[')?;
    let inner = segment.strip_suffix(']')?;
    Some((&segment[..bracket_start], &inner[bracket_start + 1..]))
}
