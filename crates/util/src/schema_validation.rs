//! JSON Schema validation of tool arguments.
//!
//! Covers the subset of draft 2020-12 that generated tool input schemas use:
//! `type` (single or list, including `null`), `enum`, `const`, `anyOf`,
//! `oneOf`, `$ref` into `$defs`, numeric bounds, string length, `pattern`,
//! `format` (`uri`, `email`, `date`, `date-time`), `properties`, `required`,
//! `additionalProperties: false`, `items`, `minItems` and `maxItems`.
//! Unknown keywords and formats are ignored.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{is_calendar_date, parse_event_timestamp};

/// Compiled `pattern` keywords. Invalid patterns are cached as `None`.
static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Option<Regex>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled_pattern(pattern: &str) -> Option<Regex> {
    let mut cache = PATTERN_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(pattern.to_string())
        .or_insert_with(|| Regex::new(pattern).ok())
        .clone()
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON path where the violation occurred, rooted at `$`.
    pub path: String,
    /// Stable rule identifier for machine-readable handling.
    pub rule: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Converts this violation into a JSON object for transport layers.
    pub fn to_json_value(&self) -> Value {
        serde_json::json!({
            "path": self.path,
            "rule": self.rule,
            "message": self.message,
        })
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collects every violation of `schema` by `instance`.
pub fn collect_schema_violations(schema: &Value, instance: &Value) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    validate_node(schema, schema, instance, "$", &mut violations);
    violations
}

/// Returns `Ok(())` when `instance` satisfies `schema`, otherwise all violations.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Result<(), Vec<SchemaViolation>> {
    let violations = collect_schema_violations(schema, instance);
    if violations.is_empty() {
        return Ok(());
    }
    Err(violations)
}

fn validate_node(root: &Value, schema: &Value, instance: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let map = match schema {
        Value::Bool(true) => return,
        Value::Bool(false) => {
            violations.push(SchemaViolation::new(path, "schema", "no value is allowed here"));
            return;
        }
        Value::Object(map) => map,
        _ => return,
    };

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        match resolve_reference(root, reference) {
            Some(target) => validate_node(root, target, instance, path, violations),
            None => violations.push(SchemaViolation::new(
                path,
                "schema",
                format!("unresolvable schema reference '{reference}'"),
            )),
        }
    }

    for keyword in ["anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = map.get(keyword) {
            validate_alternatives(root, branches, instance, path, violations);
        }
    }

    if let Some(expected) = map.get("type")
        && !matches_type(expected, instance)
    {
        violations.push(SchemaViolation::new(
            path,
            "type",
            format!("expected {}, found {}", describe_type(expected), json_type_name(instance)),
        ));
        // Further keywords only produce noise once the type is wrong.
        return;
    }

    if let Some(Value::Array(allowed)) = map.get("enum")
        && !allowed.contains(instance)
    {
        let choices = allowed.iter().map(Value::to_string).collect::<Vec<_>>().join(", ");
        violations.push(SchemaViolation::new(path, "enum", format!("must be one of: {choices}")));
    }

    if let Some(expected) = map.get("const")
        && expected != instance
    {
        violations.push(SchemaViolation::new(path, "const", format!("must equal {expected}")));
    }

    match instance {
        Value::Number(_) => validate_number(map, instance, path, violations),
        Value::String(text) => validate_string(map, text, path, violations),
        Value::Array(items) => validate_array(root, map, items, path, violations),
        Value::Object(object) => validate_object(root, map, object, path, violations),
        _ => {}
    }
}

fn validate_alternatives(root: &Value, branches: &[Value], instance: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let mut best: Option<Vec<SchemaViolation>> = None;
    for branch in branches {
        let mut branch_violations = Vec::new();
        validate_node(root, branch, instance, path, &mut branch_violations);
        if branch_violations.is_empty() {
            return;
        }
        // Report the branch that got furthest, which is usually the one the caller meant.
        let is_better = best
            .as_ref()
            .is_none_or(|current| branch_violations.iter().all(|v| v.rule != "type") && current.iter().any(|v| v.rule == "type"));
        if is_better {
            best = Some(branch_violations);
        }
    }
    if let Some(branch_violations) = best {
        violations.extend(branch_violations);
    }
}

fn validate_number(map: &Map<String, Value>, instance: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let Some(value) = instance.as_f64() else {
        return;
    };
    if let Some(minimum) = map.get("minimum").and_then(Value::as_f64)
        && value < minimum
    {
        violations.push(SchemaViolation::new(path, "minimum", format!("must be >= {minimum}")));
    }
    if let Some(maximum) = map.get("maximum").and_then(Value::as_f64)
        && value > maximum
    {
        violations.push(SchemaViolation::new(path, "maximum", format!("must be <= {maximum}")));
    }
    if let Some(minimum) = map.get("exclusiveMinimum").and_then(Value::as_f64)
        && value <= minimum
    {
        violations.push(SchemaViolation::new(path, "exclusive_minimum", format!("must be > {minimum}")));
    }
    if let Some(maximum) = map.get("exclusiveMaximum").and_then(Value::as_f64)
        && value >= maximum
    {
        violations.push(SchemaViolation::new(path, "exclusive_maximum", format!("must be < {maximum}")));
    }
}

fn validate_string(map: &Map<String, Value>, text: &str, path: &str, violations: &mut Vec<SchemaViolation>) {
    let length = text.chars().count() as u64;
    if let Some(min_length) = map.get("minLength").and_then(Value::as_u64)
        && length < min_length
    {
        violations.push(SchemaViolation::new(
            path,
            "min_length",
            format!("must be at least {min_length} character(s) long"),
        ));
    }
    if let Some(max_length) = map.get("maxLength").and_then(Value::as_u64)
        && length > max_length
    {
        violations.push(SchemaViolation::new(
            path,
            "max_length",
            format!("must be at most {max_length} character(s) long"),
        ));
    }
    if let Some(pattern) = map.get("pattern").and_then(Value::as_str)
        && let Some(regex) = compiled_pattern(pattern)
        && !regex.is_match(text)
    {
        violations.push(SchemaViolation::new(path, "pattern", format!("must match pattern '{pattern}'")));
    }
    if let Some(format) = map.get("format").and_then(Value::as_str)
        && let Some(expectation) = format_violation(format, text)
    {
        violations.push(SchemaViolation::new(path, "format", expectation));
    }
}

/// Returns a message when `text` does not satisfy a known `format`.
fn format_violation(format: &str, text: &str) -> Option<String> {
    let valid = match format {
        "uri" | "url" => url::Url::parse(text)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
            .unwrap_or(false),
        "email" => is_plausible_email(text),
        "date" => is_calendar_date(text),
        "date-time" => parse_event_timestamp(text).is_some(),
        _ => return None,
    };
    if valid {
        return None;
    }
    let expectation = match format {
        "uri" | "url" => "must be an absolute http(s) URL",
        "email" => "must be an email address",
        "date" => "must be a date formatted as YYYY-MM-DD",
        _ => "must be a timestamp formatted as YYYY-MM-DDTHH:MM:SS with an optional offset",
    };
    Some(expectation.to_string())
}

fn is_plausible_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !text.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_array(root: &Value, map: &Map<String, Value>, items: &[Value], path: &str, violations: &mut Vec<SchemaViolation>) {
    if let Some(min_items) = map.get("minItems").and_then(Value::as_u64)
        && (items.len() as u64) < min_items
    {
        violations.push(SchemaViolation::new(
            path,
            "min_items",
            format!("must contain at least {min_items} item(s)"),
        ));
    }
    if let Some(max_items) = map.get("maxItems").and_then(Value::as_u64)
        && (items.len() as u64) > max_items
    {
        violations.push(SchemaViolation::new(
            path,
            "max_items",
            format!("must contain at most {max_items} item(s)"),
        ));
    }
    if let Some(item_schema) = map.get("items") {
        for (index, item) in items.iter().enumerate() {
            validate_node(root, item_schema, item, &format!("{path}[{index}]"), violations);
        }
    }
}

fn validate_object(root: &Value, map: &Map<String, Value>, object: &Map<String, Value>, path: &str, violations: &mut Vec<SchemaViolation>) {
    if let Some(Value::Array(required)) = map.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                violations.push(SchemaViolation::new(
                    format!("{path}.{name}"),
                    "required",
                    "missing required field",
                ));
            }
        }
    }

    let properties = map.get("properties").and_then(Value::as_object);
    for (name, value) in object {
        let child_path = format!("{path}.{name}");
        match properties.and_then(|properties| properties.get(name)) {
            Some(property_schema) => validate_node(root, property_schema, value, &child_path, violations),
            None => match map.get("additionalProperties") {
                Some(Value::Bool(false)) => {
                    violations.push(SchemaViolation::new(child_path, "additional_properties", "unknown field"));
                }
                Some(additional @ Value::Object(_)) => validate_node(root, additional, value, &child_path, violations),
                _ => {}
            },
        }
    }
}

fn resolve_reference<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    root.pointer(pointer)
}

fn matches_type(expected: &Value, instance: &Value) -> bool {
    match expected {
        Value::String(name) => matches_type_name(name, instance),
        Value::Array(names) => names.iter().filter_map(Value::as_str).any(|name| matches_type_name(name, instance)),
        _ => true,
    }
}

fn matches_type_name(name: &str, instance: &Value) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => instance.is_boolean(),
        "string" => instance.is_string(),
        "array" => instance.is_array(),
        "object" => instance.is_object(),
        "number" => instance.is_number(),
        "integer" => match instance {
            Value::Number(number) => number.is_i64() || number.is_u64() || number.as_f64().is_some_and(|value| value.fract() == 0.0),
            _ => false,
        },
        _ => true,
    }
}

fn describe_type(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" or "),
        other => other.to_string(),
    }
}

fn json_type_name(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patterns_are_compiled_once() {
        let schema = json!({ "type": "string", "pattern": "^cache-[0-9]+$" });
        assert!(validate_against_schema(&schema, &json!("cache-1")).is_ok());
        assert!(validate_against_schema(&schema, &json!("cache-x")).is_err());

        let cache = PATTERN_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(matches!(cache.get("^cache-[0-9]+$"), Some(Some(_))));
    }

    #[test]
    fn invalid_patterns_are_cached_and_ignored() {
        let schema = json!({ "type": "string", "pattern": "([unclosed" });
        assert!(validate_against_schema(&schema, &json!("anything")).is_ok());
        assert!(validate_against_schema(&schema, &json!("anything else")).is_ok());

        let cache = PATTERN_CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(matches!(cache.get("([unclosed"), Some(None)));
    }

    fn agent_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "temperature": { "type": ["number", "null"], "minimum": 0.0, "maximum": 1.0 },
                "view": { "type": ["string", "null"], "enum": ["day", "week", "month", null] },
                "url": { "type": "string", "format": "uri" },
                "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 2 }
            },
            "required": ["name"]
        })
    }

    #[test]
    fn accepts_valid_arguments() {
        let args = json!({ "name": "Support Bot", "temperature": 0.3, "view": "week", "url": "https://example.com/doc" });
        assert!(validate_against_schema(&agent_schema(), &args).is_ok());
    }

    #[test]
    fn reports_missing_required_field() {
        let violations = collect_schema_violations(&agent_schema(), &json!({}));
        assert_eq!(violations, vec![SchemaViolation::new("$.name", "required", "missing required field")]);
    }

    #[test]
    fn reports_every_violation() {
        let args = json!({ "name": "", "temperature": 1.5, "view": "year", "url": "not a url", "tags": ["a", 2, "c"] });
        let rules: Vec<(String, String)> = collect_schema_violations(&agent_schema(), &args)
            .into_iter()
            .map(|violation| (violation.path, violation.rule))
            .collect();

        assert!(rules.contains(&("$.name".into(), "min_length".into())));
        assert!(rules.contains(&("$.temperature".into(), "maximum".into())));
        assert!(rules.contains(&("$.view".into(), "enum".into())));
        assert!(rules.contains(&("$.url".into(), "format".into())));
        assert!(rules.contains(&("$.tags".into(), "max_items".into())));
        assert!(rules.contains(&("$.tags[1]".into(), "type".into())));
    }

    #[test]
    fn null_is_accepted_for_nullable_fields() {
        let args = json!({ "name": "Bot", "temperature": null, "view": null });
        assert!(validate_against_schema(&agent_schema(), &args).is_ok());
    }

    #[test]
    fn integer_type_rejects_fractions() {
        let schema = json!({ "type": "integer", "minimum": 1, "maximum": 250 });
        assert!(validate_against_schema(&schema, &json!(20)).is_ok());
        assert!(validate_against_schema(&schema, &json!(20.0)).is_ok());
        let violations = collect_schema_violations(&schema, &json!(2.5));
        assert_eq!(violations[0].rule, "type");
        let violations = collect_schema_violations(&schema, &json!(0));
        assert_eq!(violations[0].rule, "minimum");
    }

    #[test]
    fn any_of_accepts_matching_branch() {
        let schema = json!({
            "anyOf": [
                { "type": "object", "properties": { "stability": { "type": "number", "maximum": 1.0 } } },
                { "type": "null" }
            ]
        });
        assert!(validate_against_schema(&schema, &json!(null)).is_ok());
        assert!(validate_against_schema(&schema, &json!({ "stability": 0.5 })).is_ok());

        let violations = collect_schema_violations(&schema, &json!({ "stability": 3.0 }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$.stability");
        assert_eq!(violations[0].rule, "maximum");
    }

    #[test]
    fn resolves_local_references() {
        let schema = json!({
            "type": "object",
            "properties": { "view": { "$ref": "#/$defs/View" } },
            "$defs": { "View": { "type": "string", "enum": ["day", "week"] } }
        });
        let violations = collect_schema_violations(&schema, &json!({ "view": "month" }));
        assert_eq!(violations[0].rule, "enum");
    }

    #[test]
    fn format_checks_cover_dates_and_emails() {
        let schema = json!({
            "type": "object",
            "properties": {
                "start": { "type": "string", "format": "date-time" },
                "day": { "type": "string", "format": "date" },
                "email": { "type": "string", "format": "email" },
                "precision": { "type": "number", "format": "double" }
            }
        });
        let valid = json!({ "start": "2025-03-01T09:30:00Z", "day": "2025-03-01", "email": "anna@example.com", "precision": 1.0 });
        assert!(validate_against_schema(&schema, &valid).is_ok());

        let invalid = json!({ "start": "next tuesday", "day": "2025-02-30", "email": "anna@" });
        let violations = collect_schema_violations(&schema, &invalid);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|violation| violation.rule == "format"));
    }

    #[test]
    fn rejects_unknown_fields_only_when_closed() {
        let closed = json!({ "type": "object", "properties": {}, "additionalProperties": false });
        let violations = collect_schema_violations(&closed, &json!({ "extra": 1 }));
        assert_eq!(violations[0].rule, "additional_properties");

        let open = json!({ "type": "object", "properties": {} });
        assert!(validate_against_schema(&open, &json!({ "extra": 1 })).is_ok());
    }
}
