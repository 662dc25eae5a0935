//! Error types for tool invocations.

use serde_json::{Value, json};
use thiserror::Error;
use voiceforge_api::ApiError;
use voiceforge_n8n::N8nError;
use voiceforge_util::SchemaViolation;

/// Failure of a single tool invocation.
///
/// None of these escape the registry: every variant is rendered into an
/// error-flagged tool result by [`crate::registry::ToolOutput::failure`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments for {tool}: {}", summarize_violations(.violations))]
    InvalidArguments { tool: String, violations: Vec<SchemaViolation> },

    #[error(transparent)]
    Upstream(#[from] ApiError),

    #[error(transparent)]
    Automation(#[from] N8nError),

    #[error("Unexpected response from {endpoint}: {reason}")]
    UnexpectedResponse { endpoint: String, reason: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
}

fn summarize_violations(violations: &[SchemaViolation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, violations: Vec<SchemaViolation>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            violations,
        }
    }

    pub fn unexpected_response(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, ToolError::Automation(error) if error.is_access_denied())
    }

    /// Stable, upper snake case code for machine-readable handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments { .. } => "INVALID_ARGUMENTS",
            ToolError::Upstream(error) => error.error_code(),
            ToolError::Automation(N8nError::Api(error)) => error.error_code(),
            ToolError::Automation(N8nError::AccessDenied { .. }) => "ACCESS_DENIED",
            ToolError::Automation(N8nError::UnexpectedResponse(_)) | ToolError::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            ToolError::UnknownTool { .. } => "UNKNOWN_TOOL",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments { .. } | ToolError::UnknownTool { .. } => "validation",
            ToolError::Upstream(error) | ToolError::Automation(N8nError::Api(error)) => api_category(error),
            ToolError::Automation(N8nError::AccessDenied { .. }) => "access_denied",
            ToolError::Automation(N8nError::UnexpectedResponse(_)) | ToolError::UnexpectedResponse { .. } => "upstream",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::Upstream(error) | ToolError::Automation(N8nError::Api(error)) => error.is_retryable(),
            _ => false,
        }
    }

    fn suggested_action(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments { .. } => "Fix the listed arguments and call the tool again.",
            ToolError::UnknownTool { .. } => "Call tools/list to see the available tool names.",
            ToolError::Automation(N8nError::AccessDenied { .. }) => {
                "Use a workflow tagged for this agent, or list the agent's workflows with n8n_list_workflows."
            }
            _ if self.is_retryable() => "The upstream may recover; retry later.",
            _ => "Check the identifiers and the configured credentials.",
        }
    }

    fn context(&self, tool: &str) -> Value {
        let mut context = json!({ "tool": tool });
        match self {
            ToolError::Upstream(error) | ToolError::Automation(N8nError::Api(error)) => {
                if let Some(status) = error.status() {
                    context["status"] = json!(status);
                }
            }
            ToolError::Automation(N8nError::AccessDenied { workflow_id, agent_id }) => {
                context["workflowId"] = json!(workflow_id);
                context["agentId"] = json!(agent_id);
            }
            ToolError::UnexpectedResponse { endpoint, .. } => {
                context["endpoint"] = json!(endpoint);
            }
            _ => {}
        }
        context
    }

    /// Structured error payload attached to error-flagged tool results.
    pub fn to_error_data(&self, tool: &str) -> Value {
        let violations = match self {
            ToolError::InvalidArguments { violations, .. } => Some(violations.iter().map(SchemaViolation::to_json_value).collect()),
            _ => None,
        };
        build_error_data(
            self.error_code(),
            self.category(),
            &self.to_string(),
            self.context(tool),
            self.is_retryable(),
            self.suggested_action(),
            violations,
        )
    }
}

fn api_category(error: &ApiError) -> &'static str {
    match error {
        ApiError::Status { .. } | ApiError::MalformedBody { .. } => "upstream",
        ApiError::Transport(_) => "transport",
        ApiError::InvalidHeader { .. } | ApiError::InvalidBaseUrl { .. } => "configuration",
    }
}

fn build_error_data(
    error_code: &str,
    category: &str,
    message: &str,
    context: Value,
    retryable: bool,
    suggested_action: &str,
    violations: Option<Vec<Value>>,
) -> Value {
    let mut payload = json!({
        "error_code": error_code,
        "category": category,
        "message": message,
        "context": context,
        "retryable": retryable,
        "suggested_action": suggested_action,
    });
    if let Some(violations) = violations {
        payload["violations"] = Value::Array(violations);
    }
    payload
}
