use thiserror::Error;
use voiceforge_api::ApiError;

#[derive(Debug, Error)]
pub enum N8nError {
    #[error("n8n API error: {0}")]
    Api(#[from] ApiError),

    /// The workflow lacks the `agent:<agentId>` tag for the calling agent.
    #[error("Access denied: workflow {workflow_id} does not belong to agent {agent_id}")]
    AccessDenied { workflow_id: String, agent_id: String },

    #[error("unexpected n8n response: {0}")]
    UnexpectedResponse(String),
}

impl N8nError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, N8nError::AccessDenied { .. })
    }
}
