//! # HTTP Utilities
//!
//! Helpers for turning upstream HTTP responses into readable messages and
//! query strings.

use serde_json::{Map, Value};

use crate::truncate_for_summary;

const ERROR_TEXT_LIMIT: usize = 300;

/// Extracts a human-readable error message from a failed response body.
///
/// The lookup order is `error` (a string, or an object carrying `message`),
/// then a top-level `message`. Any other non-empty body, JSON or not, is
/// returned as trimmed, truncated text. Returns `None` only for an empty body
/// so the caller can fall back to `HTTP <status>`.
///
/// # Example
/// ```rust
/// use voiceforge_util::extract_error_message;
///
/// assert_eq!(extract_error_message(r#"{"error":"Agent not found"}"#).as_deref(), Some("Agent not found"));
/// assert_eq!(extract_error_message(r#"{"message":"Invalid date range"}"#).as_deref(), Some("Invalid date range"));
/// assert_eq!(extract_error_message(r#"{"ok":false}"#).as_deref(), Some(r#"{"ok":false}"#));
/// assert_eq!(extract_error_message("   "), None);
/// ```
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => error_message_from_map(&map),
        Ok(Value::String(text)) if !text.trim().is_empty() => Some(truncate_for_summary(&text, ERROR_TEXT_LIMIT)),
        _ => None,
    };
    message.or_else(|| Some(truncate_for_summary(trimmed, ERROR_TEXT_LIMIT)))
}

fn error_message_from_map(map: &Map<String, Value>) -> Option<String> {
    let from_error = match map.get("error") {
        Some(Value::String(text)) => Some(text.as_str()),
        Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str),
        _ => None,
    };
    from_error
        .or_else(|| map.get("message").and_then(Value::as_str))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| truncate_for_summary(text, ERROR_TEXT_LIMIT))
}

/// Collapses whitespace and truncates a response body for diagnostics.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Flattens a JSON object into query pairs, repeating keys for array values
/// and skipping nulls.
pub fn build_query_pairs(query_parameters: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in query_parameters {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), query_value_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), query_value_to_string(other))),
        }
    }
    pairs
}

fn query_value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
