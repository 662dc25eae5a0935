//! Input schema generation for tool arguments.

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde_json::Value;

/// Generates the published input schema for `T`.
///
/// Subschemas are inlined so the result is self-contained, and the
/// `$schema` and `title` keys are dropped since `tools/list` carries its own
/// title. Non-object roots are wrapped so hosts always see `type: object`.
pub fn input_schema_for<T: JsonSchema>() -> JsonObject {
    let generator = SchemaSettings::draft2020_12()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator();
    let root = generator.into_root_schema_for::<T>();
    let mut schema = match root.as_value() {
        Value::Object(map) => map.clone(),
        _ => JsonObject::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        schema.insert("type".to_string(), Value::String("object".to_string()));
    }
    schema
}
