use std::sync::Arc;
use std::time::Instant;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData as McpError, Implementation, ListToolsResult, PaginatedRequestParams,
    ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{ServerHandler, service::RequestContext};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::registry::{ToolOutput, ToolRegistry};
use crate::server::log_payload::{build_log_payload, render_log_payload};

const SERVER_INSTRUCTIONS: &str = "VoiceForge platform tools.\n\
AGENTS: list_agents first to discover agent ids; most tools take agentId.\n\
READS: get_* tools return the raw record; list_* tools return a short summary.\n\
UPDATES: update_* tools only change the fields you pass.\n\
N8N: n8n_* tools act on the automation engine. Workflows belong to an agent through the tag agent:<agentId>; \
mutating and executing a workflow requires passing the owning agentId. This is a convenience check, not a security boundary.";

/// MCP server handler backed by a [`ToolRegistry`].
#[derive(Clone, Debug)]
pub struct VoiceForgeMcpCore {
    registry: Arc<ToolRegistry>,
}

impl VoiceForgeMcpCore {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs one tool call and logs its outcome.
    pub async fn dispatch(&self, tool_name: &str, arguments: Option<Map<String, Value>>) -> CallToolResult {
        let started_at = Instant::now();
        let output = self.registry.call(tool_name, arguments.clone()).await;
        self.emit_log(tool_name, arguments.as_ref(), &output, started_at);
        output.into_call_tool_result()
    }

    fn emit_log(&self, tool_name: &str, arguments: Option<&Map<String, Value>>, output: &ToolOutput, started_at: Instant) {
        let duration_ms = started_at.elapsed().as_millis() as u64;
        if output.is_error {
            let error_code = output
                .details
                .as_ref()
                .and_then(|details| details.get("error_code"))
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            warn!(tool = tool_name, duration_ms, error_code, "tool call failed");
        } else {
            info!(tool = tool_name, duration_ms, "tool call succeeded");
        }
        debug!(
            tool = tool_name,
            payload = %render_log_payload(&build_log_payload(arguments, output)),
            "tool call payload"
        );
    }
}

impl ServerHandler for VoiceForgeMcpCore {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.registry.tools())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { Ok(self.dispatch(&request.name, request.arguments).await) }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "voiceforge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("VoiceForge MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}
