use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use voiceforge_types::ChatReply;
use voiceforge_util::build_path;

use super::common::request_body;
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const CHAT_PATH: &str = "/api/agents/{agentId}/chat";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    /// Message to send to the agent.
    #[schemars(length(min = 1))]
    pub message: String,
    /// Continue an existing conversation instead of starting a new one.
    pub conversation_id: Option<String>,
}

impl ToolInput for ChatInput {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::write(
            "chat",
            "Send a message to an agent and return its reply. Pass the returned conversation id to continue the same conversation.",
        ),
        chat,
    );
}

async fn chat(context: Arc<ToolContext>, input: ChatInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(CHAT_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let reply: ChatReply =
        serde_json::from_value(payload).map_err(|error| ToolError::unexpected_response(&path, error.to_string()))?;
    let Some(text) = reply.text() else {
        return Err(ToolError::unexpected_response(&path, "the reply carries no message text"));
    };

    let conversation_id = reply
        .conversation_id
        .as_deref()
        .or(input.conversation_id.as_deref())
        .unwrap_or("-");
    Ok(ToolOutput::text(format!("{text}\n\n[Conversation: {conversation_id}]")))
}
