// src/judge/response.rs
//! Normalize free-text judge answers into verdict lists.
//!
//! Models wrap JSON in code fences, prepend prose, or nest the array in an object.
//! Everything here is string cleanup; batch logic only sees `Ok(verdicts)` or a typed error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::JudgeError;

/// `{"index": 3, "relevant": true}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RelevanceVerdict {
    pub index: usize,
    pub relevant: bool,
}

/// `{"index": 3, "category": "research-paper"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryVerdict {
    pub index: usize,
    pub category: String,
}

static FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").unwrap());

/// Strip markdown code fences. An unterminated fence (truncated answer) loses only its
/// opening line.
pub fn strip_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(caps) = FENCED.captures(trimmed) {
        if let Some(body) = caps.get(1) {
            return body.as_str().trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        return match rest.find('\n') {
            Some(nl) => rest[nl + 1..].trim(),
            None => "",
        };
    }
    trimmed
}

/// Parse a JSON array of verdicts out of a judge answer.
pub fn parse_verdicts<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, JudgeError> {
    if raw.trim().is_empty() {
        return Err(JudgeError::EmptyResponse);
    }
    let body = strip_wrapping(raw);
    if body.is_empty() {
        return Err(JudgeError::EmptyResponse);
    }

    let first_err = match serde_json::from_str::<Vec<T>>(body) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };

    // Prose around the array.
    if let (Some(start), Some(end)) = (body.find('['), body.rfind(']')) {
        if start < end {
            if let Ok(v) = serde_json::from_str::<Vec<T>>(&body[start..=end]) {
                return Ok(v);
            }
        }
    }

    // `{"results": [...]}` and similar single-array wrappers.
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(arr) = map.into_iter().find_map(|(_, v)| match v {
            Value::Array(_) => Some(v),
            _ => None,
        }) {
            return serde_json::from_value::<Vec<T>>(arr)
                .map_err(|e| JudgeError::Malformed(e.to_string()));
        }
    }

    Err(JudgeError::Malformed(first_err.to_string()))
}
