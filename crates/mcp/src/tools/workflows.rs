//! Workflows defined on the platform itself.
//!
//! These are distinct from automation-engine workflows, which live in
//! [`super::n8n`].

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voiceforge_types::{PlatformWorkflow, decode_list};
use voiceforge_util::{SchemaViolation, build_path};

use super::common::{AgentRef, decode_record, or_dash, render_list, request_body, require_changes, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const WORKFLOWS_PATH: &str = "/api/agents/{agentId}/workflows";
const WORKFLOW_PATH: &str = "/api/agents/{agentId}/workflows/{workflowId}";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Draft,
    Active,
    Inactive,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    /// What starts the workflow, e.g. `{ "type": "call.ended" }`.
    pub trigger: Option<Value>,
    pub nodes: Option<Vec<Value>>,
    pub edges: Option<Vec<Value>>,
    pub status: Option<WorkflowStatus>,
}

impl ToolInput for CreateWorkflowInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub workflow_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub trigger: Option<Value>,
    pub nodes: Option<Vec<Value>>,
    pub edges: Option<Vec<Value>>,
    pub status: Option<WorkflowStatus>,
}

impl ToolInput for UpdateWorkflowInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(
            self.name.is_some()
                || self.description.is_some()
                || self.trigger.is_some()
                || self.nodes.is_some()
                || self.edges.is_some()
                || self.status.is_some(),
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRef {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub workflow_id: String,
}

impl ToolInput for WorkflowRef {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_workflows", "List the platform workflows of an agent."),
        list_workflows,
    );
    registry.register(
        ToolSpec::read_only("get_workflow", "Get one platform workflow with its trigger, nodes and edges."),
        get_workflow,
    );
    registry.register(
        ToolSpec::write("create_workflow", "Create a platform workflow for an agent."),
        create_workflow,
    );
    registry.register(
        ToolSpec::write(
            "update_workflow",
            "Update a platform workflow. Only the fields you pass are changed.",
        ),
        update_workflow,
    );
    registry.register(
        ToolSpec::destructive("delete_workflow", "Delete a platform workflow."),
        delete_workflow,
    );
}

fn version_label(version: Option<&Value>) -> String {
    match version {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => version.to_string(),
        _ => "-".to_string(),
    }
}

async fn list_workflows(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(WORKFLOWS_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    let workflows: Vec<PlatformWorkflow> = decode_list(&payload, "workflows");
    let lines = workflows
        .iter()
        .map(|workflow| {
            format!(
                "• {} v{} [{}] ({})",
                or_dash(workflow.name.as_deref()),
                version_label(workflow.version.as_ref()),
                or_dash(workflow.status.as_deref()),
                or_dash(workflow.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} workflows:", workflows.len()),
        lines,
        "No workflows found for this agent",
    )))
}

async fn get_workflow(context: Arc<ToolContext>, input: WorkflowRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        WORKFLOW_PATH,
        &[("agentId", input.agent_id.as_str()), ("workflowId", input.workflow_id.as_str())],
    );
    let payload = context.platform.get(&path).await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "workflow")))
}

async fn create_workflow(context: Arc<ToolContext>, input: CreateWorkflowInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(WORKFLOWS_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let workflow: PlatformWorkflow = decode_record(&payload, "workflow");
    Ok(ToolOutput::text(format!(
        "Workflow \"{}\" created\n\nID: {}\nStatus: {}",
        workflow.name.as_deref().unwrap_or(&input.name),
        or_dash(workflow.id.as_deref()),
        or_dash(workflow.status.as_deref())
    )))
}

async fn update_workflow(context: Arc<ToolContext>, input: UpdateWorkflowInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        WORKFLOW_PATH,
        &[("agentId", input.agent_id.as_str()), ("workflowId", input.workflow_id.as_str())],
    );
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let workflow: PlatformWorkflow = decode_record(&payload, "workflow");
    Ok(ToolOutput::text(format!(
        "Workflow \"{}\" updated (version {})",
        workflow.name.as_deref().unwrap_or(&input.workflow_id),
        version_label(workflow.version.as_ref())
    )))
}

async fn delete_workflow(context: Arc<ToolContext>, input: WorkflowRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        WORKFLOW_PATH,
        &[("agentId", input.agent_id.as_str()), ("workflowId", input.workflow_id.as_str())],
    );
    context.platform.delete(&path).await?;
    Ok(ToolOutput::text(format!("Workflow {} deleted", input.workflow_id)))
}
