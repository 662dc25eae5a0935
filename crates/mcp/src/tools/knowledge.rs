use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use voiceforge_types::{KnowledgeBase, decode_list};
use voiceforge_util::build_path;

use super::common::{AgentRef, decode_record, or_dash, render_list};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const KNOWLEDGE_PATH: &str = "/api/agents/{agentId}/knowledge";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddKnowledgeTextInput {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    /// Document name shown in the knowledge base list.
    #[schemars(length(min = 1))]
    pub name: String,
    /// Plain text the agent can draw answers from.
    #[schemars(length(min = 1))]
    pub content: String,
}

impl ToolInput for AddKnowledgeTextInput {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddKnowledgeUrlInput {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    /// Page the platform fetches and indexes.
    #[schemars(url)]
    pub url: String,
}

impl ToolInput for AddKnowledgeUrlInput {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_knowledge", "List the knowledge bases of an agent with their type and status."),
        list_knowledge,
    );
    registry.register(
        ToolSpec::write("add_knowledge_text", "Add a plain text document to an agent's knowledge base."),
        add_knowledge_text,
    );
    registry.register(
        ToolSpec::write("add_knowledge_url", "Add the content of a web page to an agent's knowledge base."),
        add_knowledge_url,
    );
}

async fn list_knowledge(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(KNOWLEDGE_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    let knowledge_bases: Vec<KnowledgeBase> = decode_list(&payload, "knowledgeBases");
    let lines = knowledge_bases
        .iter()
        .map(|knowledge_base| {
            format!(
                "• {} ({}) - {}",
                or_dash(knowledge_base.name.as_deref()),
                or_dash(knowledge_base.kind.as_deref()),
                or_dash(knowledge_base.status.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list("Knowledge bases:", lines, "No knowledge bases found")))
}

async fn add_knowledge_text(context: Arc<ToolContext>, input: AddKnowledgeTextInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(KNOWLEDGE_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = json!({ "name": input.name, "content": input.content, "type": "text" });
    let payload = context.platform.post(&path, &body).await?;
    let knowledge_base: KnowledgeBase = decode_record(&payload, "knowledgeBase");
    Ok(ToolOutput::text(format!(
        "Knowledge base \"{}\" created",
        knowledge_base.name.as_deref().unwrap_or(&input.name)
    )))
}

async fn add_knowledge_url(context: Arc<ToolContext>, input: AddKnowledgeUrlInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(KNOWLEDGE_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = json!({ "name": input.name, "url": input.url, "type": "url" });
    let payload = context.platform.post(&path, &body).await?;
    let knowledge_base: KnowledgeBase = decode_record(&payload, "knowledgeBase");
    Ok(ToolOutput::text(format!(
        "Knowledge base \"{}\" created from {}",
        knowledge_base.name.as_deref().unwrap_or(&input.name),
        input.url
    )))
}
