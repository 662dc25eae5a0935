use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use voiceforge_types::{Agent, decode_list};
use voiceforge_util::{SchemaViolation, build_path};

use super::common::{AgentRef, NoArguments, decode_record, or_dash, render_list, request_body, require_changes, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const AGENTS_PATH: &str = "/api/agents";
const AGENT_PATH: &str = "/api/agents/{agentId}";
const AGENT_WIDGET_PATH: &str = "/api/agents/{agentId}/widget";

/// Language the platform assigns when an agent has none.
const DEFAULT_LANGUAGE: &str = "it-IT";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentInput {
    /// Display name of the agent.
    #[schemars(length(min = 1))]
    pub name: String,
    /// System prompt defining the agent's behaviour and personality.
    #[schemars(length(min = 1))]
    pub system_prompt: String,
    /// Short description.
    pub description: Option<String>,
    /// Message the agent opens every conversation with.
    pub first_message: Option<String>,
    /// BCP 47 language tag. The platform defaults to it-IT.
    pub language: Option<String>,
    /// LLM model. The platform defaults to gpt-4o-mini.
    pub llm_model: Option<String>,
    /// Sampling temperature between 0 and 1. The platform defaults to 0.7.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,
}

impl ToolInput for CreateAgentInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentInput {
    /// Agent identifier.
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub description: Option<String>,
    pub first_message: Option<String>,
    pub language: Option<String>,
    pub llm_model: Option<String>,
    #[schemars(range(min = 0.0, max = 1.0))]
    pub temperature: Option<f64>,
}

impl ToolInput for UpdateAgentInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(
            self.name.is_some()
                || self.system_prompt.is_some()
                || self.description.is_some()
                || self.first_message.is_some()
                || self.language.is_some()
                || self.llm_model.is_some()
                || self.temperature.is_some(),
        )
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_agents", "List every agent of the account with its id and language."),
        list_agents,
    );
    registry.register(
        ToolSpec::read_only("get_agent", "Get the full configuration of one agent."),
        get_agent,
    );
    registry.register(
        ToolSpec::write("create_agent", "Create a new AI agent with a name and a system prompt."),
        create_agent,
    );
    registry.register(
        ToolSpec::write(
            "update_agent",
            "Update an agent. Only the fields you pass are changed; omitted fields keep their current value.",
        ),
        update_agent,
    );
    registry.register(
        ToolSpec::destructive("delete_agent", "Permanently delete an agent and everything attached to it."),
        delete_agent,
    );
    registry.register(
        ToolSpec::read_only("get_agent_widget", "Get the web widget configuration and embed code of an agent."),
        get_agent_widget,
    );
}

async fn list_agents(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(AGENTS_PATH).await?;
    let agents: Vec<Agent> = decode_list(&payload, "agents");
    let lines = agents
        .iter()
        .map(|agent| {
            format!(
                "• {} ({}) - {}",
                or_dash(agent.name.as_deref()),
                or_dash(agent.id.as_deref()),
                agent.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} agents:", agents.len()),
        lines,
        "No agents found",
    )))
}

async fn get_agent(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(&build_path(AGENT_PATH, &[("agentId", input.agent_id.as_str())])).await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "agent")))
}

async fn create_agent(context: Arc<ToolContext>, input: CreateAgentInput) -> Result<ToolOutput, ToolError> {
    let body = request_body(AGENTS_PATH, &input)?;
    let payload = context.platform.post(AGENTS_PATH, &body).await?;
    let agent: Agent = decode_record(&payload, "agent");
    Ok(ToolOutput::text(format!(
        "Agent \"{}\" created\n\nID: {}\nLanguage: {}\nModel: {}",
        agent.name.as_deref().unwrap_or(&input.name),
        or_dash(agent.id.as_deref()),
        or_dash(agent.language.as_deref()),
        or_dash(agent.llm_model.as_deref()),
    )))
}

async fn update_agent(context: Arc<ToolContext>, input: UpdateAgentInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(AGENT_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let agent: Agent = decode_record(&payload, "agent");
    Ok(ToolOutput::text(format!(
        "Agent \"{}\" updated",
        agent.name.as_deref().unwrap_or(&input.agent_id)
    )))
}

async fn delete_agent(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    context.platform.delete(&build_path(AGENT_PATH, &[("agentId", input.agent_id.as_str())])).await?;
    Ok(ToolOutput::text(format!("Agent {} deleted", input.agent_id)))
}

async fn get_agent_widget(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(AGENT_WIDGET_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "widget")))
}
