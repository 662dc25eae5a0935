//! Helpers shared by the tool handlers.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voiceforge_types::decode_envelope;
use voiceforge_util::{SchemaViolation, build_query_pairs};

use crate::registry::ToolInput;
use crate::types::ToolError;

/// Tools that take no arguments.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArguments {}

impl ToolInput for NoArguments {}

/// Tools scoped to one agent and nothing else.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    /// Agent identifier, as returned by list_agents.
    #[schemars(length(min = 1))]
    pub agent_id: String,
}

impl ToolInput for AgentRef {}

/// Violation reported by update tools called without any field to change.
pub(crate) fn require_changes(has_changes: bool) -> Vec<SchemaViolation> {
    if has_changes {
        return Vec::new();
    }
    vec![SchemaViolation::new("$", "min_properties", "provide at least one field to update")]
}

/// Serializes a tool input into a request body, dropping `null` fields.
///
/// Inputs mark path parameters `#[serde(skip_serializing)]`, so what remains
/// is exactly the set of fields the caller supplied.
pub(crate) fn request_body<T: Serialize>(endpoint: &str, input: &T) -> Result<Value, ToolError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(fields)) => Ok(Value::Object(without_nulls(fields))),
        Ok(other) => Err(ToolError::unexpected_response(endpoint, format!("request body is not an object: {other}"))),
        Err(error) => Err(ToolError::unexpected_response(endpoint, error.to_string())),
    }
}

/// Serializes a tool input into query pairs, dropping `null` fields.
pub(crate) fn query_pairs<T: Serialize>(endpoint: &str, input: &T) -> Result<Vec<(String, String)>, ToolError> {
    match request_body(endpoint, input)? {
        Value::Object(fields) => Ok(build_query_pairs(&fields)),
        _ => Ok(Vec::new()),
    }
}

fn without_nulls(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.retain(|_, value| !value.is_null());
    fields
}

/// Returns the record stored under `key`, or the whole payload when the
/// upstream answered without an envelope.
pub(crate) fn unwrap_record(payload: Value, key: &str) -> Value {
    match payload {
        Value::Object(mut fields) => match fields.remove(key) {
            Some(record) if !record.is_null() => record,
            Some(_) | None => Value::Object(fields),
        },
        other => other,
    }
}

/// Decodes the record stored under `key`, falling back to the bare payload.
///
/// Shapes that match neither decode to the default record, which renders as
/// dashes rather than failing a call that already succeeded upstream.
pub(crate) fn decode_record<T: DeserializeOwned + Default>(payload: &Value, key: &str) -> T {
    decode_envelope(payload, key)
        .or_else(|| serde_json::from_value(payload.clone()).ok())
        .unwrap_or_default()
}

/// Renders an optional field for a summary line.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|text| !text.is_empty()).unwrap_or("-")
}

/// Joins summary lines under a heading, or returns `empty` when there are none.
pub(crate) fn render_list(heading: &str, lines: Vec<String>, empty: &str) -> String {
    if lines.is_empty() {
        return empty.to_string();
    }
    format!("{heading}\n\n{}", lines.join("\n"))
}

pub(crate) fn enabled_label(enabled: Option<bool>) -> &'static str {
    match enabled {
        Some(false) => "disabled",
        _ => "enabled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Patch {
        #[serde(skip_serializing)]
        agent_id: String,
        name: Option<String>,
        temperature: Option<f64>,
    }

    #[test]
    fn request_body_keeps_only_supplied_fields() {
        let body = request_body(
            "/api/agents/a1",
            &Patch {
                agent_id: "a1".into(),
                name: Some("Support".into()),
                temperature: None,
            },
        )
        .unwrap();
        assert_eq!(body, json!({ "name": "Support" }));
    }

    #[test]
    fn unwrap_record_accepts_enveloped_and_bare_payloads() {
        assert_eq!(unwrap_record(json!({ "agent": { "id": "a1" } }), "agent"), json!({ "id": "a1" }));
        assert_eq!(unwrap_record(json!({ "id": "a1" }), "agent"), json!({ "id": "a1" }));
        assert_eq!(unwrap_record(json!({ "agent": null, "id": "a1" }), "agent"), json!({ "id": "a1" }));
    }

    #[test]
    fn render_list_uses_fallback_when_empty() {
        assert_eq!(render_list("Agents:", Vec::new(), "No agents found"), "No agents found");
        assert_eq!(render_list("Agents:", vec!["• a".into()], "none"), "Agents:\n\n• a");
    }
}
