use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voiceforge_types::{AgentTool, decode_list};
use voiceforge_util::{SchemaViolation, build_path};

use super::common::{AgentRef, decode_record, enabled_label, or_dash, render_list, request_body, require_changes};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const AGENT_TOOLS_PATH: &str = "/api/agents/{agentId}/tools";
const AGENT_TOOL_PATH: &str = "/api/agents/{agentId}/tools/{toolId}";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentToolInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    /// Function name the agent's LLM calls, e.g. create_appointment.
    #[schemars(length(min = 1))]
    pub name: String,
    /// When the agent should use the tool.
    #[schemars(length(min = 1))]
    pub description: String,
    /// Tool kind, e.g. calendar or webhook.
    #[serde(rename = "type")]
    #[schemars(length(min = 1))]
    pub kind: String,
    /// Kind-specific settings.
    pub config: Option<Map<String, Value>>,
    /// JSON schema of the arguments the LLM must supply.
    pub parameters: Option<Map<String, Value>>,
    /// Defaults to enabled on the platform.
    pub is_enabled: Option<bool>,
}

impl ToolInput for CreateAgentToolInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentToolInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub tool_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub config: Option<Map<String, Value>>,
    pub parameters: Option<Map<String, Value>>,
    pub is_enabled: Option<bool>,
}

impl ToolInput for UpdateAgentToolInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(
            self.name.is_some()
                || self.description.is_some()
                || self.kind.is_some()
                || self.config.is_some()
                || self.parameters.is_some()
                || self.is_enabled.is_some(),
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentToolRef {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub tool_id: String,
}

impl ToolInput for AgentToolRef {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_agent_tools", "List the tools (function calls) configured on an agent."),
        list_agent_tools,
    );
    registry.register(
        ToolSpec::write(
            "create_agent_tool",
            "Add a tool the agent can call during conversations, e.g. a calendar action or a webhook.",
        ),
        create_agent_tool,
    );
    registry.register(
        ToolSpec::write(
            "update_agent_tool",
            "Update an agent tool, for example to enable or disable it. Only the fields you pass are changed.",
        ),
        update_agent_tool,
    );
    registry.register(
        ToolSpec::destructive("delete_agent_tool", "Remove a tool from an agent."),
        delete_agent_tool,
    );
}

fn describe_tool(tool: &AgentTool) -> String {
    format!(
        "• {} [{}] - {} ({})",
        or_dash(tool.name.as_deref()),
        or_dash(tool.kind.as_deref()),
        enabled_label(tool.is_enabled),
        or_dash(tool.id.as_deref())
    )
}

async fn list_agent_tools(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(AGENT_TOOLS_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    let tools: Vec<AgentTool> = decode_list(&payload, "tools");
    let lines = tools.iter().map(describe_tool).collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} tools:", tools.len()),
        lines,
        "No tools configured for this agent",
    )))
}

async fn create_agent_tool(context: Arc<ToolContext>, input: CreateAgentToolInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(AGENT_TOOLS_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let tool: AgentTool = decode_record(&payload, "tool");
    Ok(ToolOutput::text(format!(
        "Tool \"{}\" created\n\nID: {}\nType: {}",
        tool.name.as_deref().unwrap_or(&input.name),
        or_dash(tool.id.as_deref()),
        tool.kind.as_deref().unwrap_or(&input.kind)
    )))
}

async fn update_agent_tool(context: Arc<ToolContext>, input: UpdateAgentToolInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        AGENT_TOOL_PATH,
        &[("agentId", input.agent_id.as_str()), ("toolId", input.tool_id.as_str())],
    );
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let tool: AgentTool = decode_record(&payload, "tool");
    Ok(ToolOutput::text(format!(
        "Tool \"{}\" updated",
        tool.name.as_deref().unwrap_or(&input.tool_id)
    )))
}

async fn delete_agent_tool(context: Arc<ToolContext>, input: AgentToolRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        AGENT_TOOL_PATH,
        &[("agentId", input.agent_id.as_str()), ("toolId", input.tool_id.as_str())],
    );
    context.platform.delete(&path).await?;
    Ok(ToolOutput::text(format!("Tool {} deleted", input.tool_id)))
}
