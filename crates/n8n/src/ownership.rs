//! Agent ownership of automation workflows.
//!
//! The automation engine has no notion of VoiceForge agents. A workflow is
//! considered to belong to an agent when it carries a tag named exactly
//! `agent:<agentId>`.
//!
//! This is an advisory check, not an access-control boundary:
//! - the agent id is supplied by the caller, so any caller that knows another
//!   agent's id passes the check for that agent's workflows;
//! - anyone with engine access can add the tag to any workflow;
//! - the check and the subsequent mutation are separate requests, so the
//!   tags can change in between.
//!
//! It exists to keep well-behaved agents from touching each other's
//! workflows by mistake.

use serde_json::Value;

const OWNERSHIP_TAG_PREFIX: &str = "agent:";

/// Tag name marking a workflow as belonging to `agent_id`.
pub fn ownership_tag(agent_id: &str) -> String {
    format!("{OWNERSHIP_TAG_PREFIX}{agent_id}")
}

/// Names of all tags attached to a raw workflow payload.
///
/// Accepts both tag objects (`[{"id": "1", "name": "agent:a1"}]`) and bare
/// names (`["agent:a1"]`). Unparseable payloads have no tags.
pub fn workflow_tag_names(workflow: &Value) -> Vec<String> {
    let Some(Value::Array(tags)) = workflow.get("tags") else {
        return Vec::new();
    };
    tags.iter()
        .filter_map(|tag| match tag {
            Value::String(name) => Some(name.clone()),
            Value::Object(tag) => tag.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Returns `true` when `workflow` carries the ownership tag for `agent_id`.
pub fn is_owned_by(workflow: &Value, agent_id: &str) -> bool {
    let expected = ownership_tag(agent_id);
    workflow_tag_names(workflow).iter().any(|name| *name == expected)
}
