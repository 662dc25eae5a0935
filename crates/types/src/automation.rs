//! Records owned by the n8n automation engine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Older engine versions use numeric ids, newer ones strings.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

/// A tag as returned by `/tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A tag reference attached to a workflow.
///
/// n8n returns full tag objects, but hand-written payloads sometimes carry
/// bare tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Object(Tag),
    Name(String),
}

impl TagRef {
    /// Returns the human-readable name of the tag, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            TagRef::Object(tag) => tag.name.as_deref(),
            TagRef::Name(name) => Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationWorkflow {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    pub nodes: Option<Vec<Value>>,
    pub connections: Option<Map<String, Value>>,
    pub tags: Vec<TagRef>,
}

impl AutomationWorkflow {
    /// Iterates over the names of all tags attached to the workflow.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().filter_map(TagRef::name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Execution {
    pub id: Option<Value>,
    pub workflow_id: Option<Value>,
    pub status: Option<String>,
    pub mode: Option<String>,
    pub finished: Option<bool>,
    pub started_at: Option<String>,
    pub stopped_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workflow_tags_accept_objects_and_names() {
        let workflow: AutomationWorkflow = serde_json::from_value(json!({
            "id": "w1",
            "tags": [{ "id": "t1", "name": "agent:a1" }, "billing"]
        }))
        .unwrap();

        let names: Vec<&str> = workflow.tag_names().collect();
        assert_eq!(names, vec!["agent:a1", "billing"]);
    }

    #[test]
    fn numeric_ids_are_read_as_strings() {
        let tag: Tag = serde_json::from_value(json!({ "id": 7, "name": "agent:a1" })).unwrap();
        assert_eq!(tag.id.as_deref(), Some("7"));

        let workflow: AutomationWorkflow = serde_json::from_value(json!({ "id": 12, "tags": [{ "id": 7, "name": "x" }] })).unwrap();
        assert_eq!(workflow.id.as_deref(), Some("12"));
    }

    #[test]
    fn workflow_without_tags_decodes() {
        let workflow: AutomationWorkflow = serde_json::from_value(json!({ "id": "w1", "active": true })).unwrap();
        assert!(workflow.tags.is_empty());
        assert_eq!(workflow.active, Some(true));
    }
}
