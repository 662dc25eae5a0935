use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use voiceforge_util::{SchemaViolation, collect_schema_violations};

use crate::types::{ToolDefinition, ToolError};

/// Typed arguments of a tool.
///
/// The JSON schema published for the tool is generated from the
/// implementing type, so field docs and `schemars` constraints become the
/// argument documentation hosts see.
pub trait ToolInput: DeserializeOwned + JsonSchema + Send + 'static {
    /// Checks the schema cannot express, run after decoding.
    fn check(&self) -> Vec<SchemaViolation> {
        Vec::new()
    }
}

/// Validates raw arguments and decodes them into `I`.
///
/// Top-level `null` values are dropped first so an explicit `null` behaves
/// exactly like an omitted argument.
pub(crate) fn decode_arguments<I: ToolInput>(definition: &ToolDefinition, mut arguments: Map<String, Value>) -> Result<I, ToolError> {
    arguments.retain(|_, value| !value.is_null());
    let instance = Value::Object(arguments);

    let violations = collect_schema_violations(definition.schema(), &instance);
    if !violations.is_empty() {
        return Err(ToolError::invalid_arguments(definition.name, violations));
    }

    let input: I = serde_json::from_value(instance)
        .map_err(|error| ToolError::invalid_arguments(definition.name, vec![SchemaViolation::new("$", "decode", error.to_string())]))?;

    let violations = input.check();
    if !violations.is_empty() {
        return Err(ToolError::invalid_arguments(definition.name, violations));
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::schemas::input_schema_for;
    use crate::types::ToolSpec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase")]
    struct RangeInput {
        label: String,
        #[schemars(range(min = 1, max = 10))]
        start: Option<u32>,
        end: Option<u32>,
    }

    impl ToolInput for RangeInput {
        fn check(&self) -> Vec<SchemaViolation> {
            match (self.start, self.end) {
                (Some(start), Some(end)) if end < start => vec![SchemaViolation::new("$.end", "order", "must not be before start")],
                _ => Vec::new(),
            }
        }
    }

    fn definition() -> ToolDefinition {
        ToolDefinition::new(ToolSpec::read_only("range", "Range"), input_schema_for::<RangeInput>())
    }

    fn arguments(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn decodes_valid_arguments() {
        let input: RangeInput = decode_arguments(&definition(), arguments(json!({ "label": "x", "start": 2, "end": 3 }))).unwrap();
        assert_eq!(input.label, "x");
        assert_eq!(input.start, Some(2));
    }

    #[test]
    fn schema_violations_are_all_reported() {
        let error = decode_arguments::<RangeInput>(&definition(), arguments(json!({ "start": 11 }))).unwrap_err();
        let ToolError::InvalidArguments { violations, .. } = error else {
            panic!("expected invalid arguments");
        };
        let rules: Vec<&str> = violations.iter().map(|violation| violation.rule.as_str()).collect();
        assert!(rules.contains(&"required"));
        assert!(rules.contains(&"maximum"));
    }

    #[test]
    fn explicit_null_is_treated_as_absent() {
        let input: RangeInput = decode_arguments(&definition(), arguments(json!({ "label": "x", "start": null }))).unwrap();
        assert_eq!(input.start, None);

        let error = decode_arguments::<RangeInput>(&definition(), arguments(json!({ "label": null }))).unwrap_err();
        assert!(error.to_string().contains("$.label"));
    }

    #[test]
    fn semantic_checks_run_after_decoding() {
        let error = decode_arguments::<RangeInput>(&definition(), arguments(json!({ "label": "x", "start": 5, "end": 4 }))).unwrap_err();
        let ToolError::InvalidArguments { violations, .. } = error else {
            panic!("expected invalid arguments");
        };
        assert_eq!(violations[0].rule, "order");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let input: RangeInput = decode_arguments(&definition(), arguments(json!({ "label": "x", "extra": true }))).unwrap();
        assert_eq!(input.label, "x");
    }
}
