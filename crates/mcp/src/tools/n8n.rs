//! Tools for the embedded n8n automation engine.
//!
//! Workflows are scoped to agents with the `agent:<agentId>` tag. Every tool
//! that reads, mutates or runs one workflow checks that tag first through
//! [`N8nClient::ensure_owned`]. The check is advisory; see
//! [`voiceforge_n8n::ownership`] for what it does not protect against.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;
use voiceforge_n8n::{ExecutionFilter, N8nClient, NewWorkflow, WorkflowFilter, is_owned_by, ownership_tag};
use voiceforge_types::{AutomationWorkflow, Credential, Execution};
use voiceforge_util::SchemaViolation;

use super::common::{NoArguments, or_dash, render_list, request_body, require_changes};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAutomationWorkflowsInput {
    /// Only return workflows tagged for this agent.
    #[schemars(length(min = 1))]
    pub agent_id: Option<String>,
    pub active: Option<bool>,
}

impl ToolInput for ListAutomationWorkflowsInput {}

/// One workflow, on behalf of one agent.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedWorkflowRef {
    /// Agent the workflow must be tagged for.
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub workflow_id: String,
}

impl ToolInput for OwnedWorkflowRef {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomationWorkflowInput {
    /// Agent that will own the workflow.
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    /// n8n node definitions.
    pub nodes: Vec<Value>,
    /// n8n connection map, keyed by source node name.
    pub connections: Map<String, Value>,
    pub settings: Option<Map<String, Value>>,
}

impl ToolInput for CreateAutomationWorkflowInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutomationWorkflowInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub workflow_id: String,
    pub name: Option<String>,
    pub nodes: Option<Vec<Value>>,
    pub connections: Option<Map<String, Value>>,
    pub settings: Option<Map<String, Value>>,
}

impl ToolInput for UpdateAutomationWorkflowInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(self.name.is_some() || self.nodes.is_some() || self.connections.is_some() || self.settings.is_some())
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAutomationWorkflowInput {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub workflow_id: String,
    /// Input passed to the workflow. Defaults to an empty object.
    pub data: Option<Value>,
}

impl ToolInput for ExecuteAutomationWorkflowInput {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
    Waiting,
    Running,
    Canceled,
}

impl ExecutionStatus {
    fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
            ExecutionStatus::Waiting => "waiting",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListExecutionsInput {
    #[schemars(length(min = 1))]
    pub workflow_id: Option<String>,
    /// Page size, 1 to 250.
    #[schemars(range(min = 1, max = 250))]
    pub limit: Option<u32>,
    pub status: Option<ExecutionStatus>,
}

impl ToolInput for ListExecutionsInput {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRef {
    #[schemars(length(min = 1))]
    pub execution_id: String,
}

impl ToolInput for ExecutionRef {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookUrlInput {
    #[schemars(length(min = 1))]
    pub workflow_id: String,
    /// Return the test-mode URL, active only while the editor listens.
    pub test: Option<bool>,
}

impl ToolInput for WebhookUrlInput {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only(
            "n8n_list_workflows",
            "List automation workflows. Pass agentId to only see the workflows tagged for that agent.",
        ),
        list_workflows,
    );
    registry.register(
        ToolSpec::read_only("n8n_get_workflow", "Get an automation workflow owned by the agent."),
        get_workflow,
    );
    registry.register(
        ToolSpec::write(
            "n8n_create_workflow",
            "Create an automation workflow from n8n nodes and connections, tagged as owned by the agent.",
        ),
        create_workflow,
    );
    registry.register(
        ToolSpec::write(
            "n8n_update_workflow",
            "Update an automation workflow owned by the agent. Only the fields you pass are changed.",
        ),
        update_workflow,
    );
    registry.register(
        ToolSpec::destructive("n8n_delete_workflow", "Delete an automation workflow owned by the agent."),
        delete_workflow,
    );
    registry.register(
        ToolSpec::write("n8n_activate_workflow", "Activate an automation workflow owned by the agent."),
        activate_workflow,
    );
    registry.register(
        ToolSpec::write("n8n_deactivate_workflow", "Deactivate an automation workflow owned by the agent."),
        deactivate_workflow,
    );
    registry.register(
        ToolSpec::write(
            "n8n_execute_workflow",
            "Run an automation workflow owned by the agent with optional input data.",
        ),
        execute_workflow,
    );
    registry.register(
        ToolSpec::read_only(
            "n8n_list_executions",
            "List recent workflow executions, optionally filtered by workflow and status.",
        ),
        list_executions,
    );
    registry.register(
        ToolSpec::read_only("n8n_get_execution", "Get one workflow execution with its result data."),
        get_execution,
    );
    registry.register(
        ToolSpec::read_only(
            "n8n_list_credentials",
            "List the credentials configured in the automation engine. Secret values are never returned.",
        ),
        list_credentials,
    );
    registry.register(
        ToolSpec::read_only(
            "n8n_get_webhook_url",
            "Build the production or test webhook URL of an automation workflow.",
        )
        .local(),
        get_webhook_url,
    );
}

fn active_label(active: Option<bool>) -> &'static str {
    match active {
        Some(true) => "active",
        _ => "inactive",
    }
}

fn describe_workflow(raw: &Value) -> String {
    let workflow: AutomationWorkflow = serde_json::from_value(raw.clone()).unwrap_or_default();
    let tags: Vec<&str> = workflow.tag_names().collect();
    let mut line = format!(
        "• {} ({}) - {}",
        or_dash(workflow.name.as_deref()),
        or_dash(workflow.id.as_deref()),
        active_label(workflow.active)
    );
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    line
}

/// Id of a workflow payload, falling back to the requested id.
fn workflow_id_of(raw: &Value, fallback: &str) -> String {
    serde_json::from_value::<AutomationWorkflow>(raw.clone())
        .ok()
        .and_then(|workflow| workflow.id)
        .unwrap_or_else(|| fallback.to_string())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

async fn list_workflows(context: Arc<ToolContext>, input: ListAutomationWorkflowsInput) -> Result<ToolOutput, ToolError> {
    let owner_tag = input.agent_id.as_deref().map(ownership_tag);
    let filter = WorkflowFilter {
        active: input.active,
        tags: owner_tag.iter().cloned().collect(),
    };
    let mut workflows = context.automation.list_workflows(&filter).await?;
    // Older engines ignore the tags query parameter.
    if let Some(agent_id) = input.agent_id.as_deref() {
        workflows.retain(|workflow| is_owned_by(workflow, agent_id));
    }

    let lines = workflows.iter().map(describe_workflow).collect();
    let empty = match owner_tag {
        Some(tag) => format!("No workflows tagged {tag}"),
        None => "No workflows found".to_string(),
    };
    Ok(ToolOutput::text(render_list(
        &format!("Found {} workflows:", workflows.len()),
        lines,
        &empty,
    )))
}

async fn get_workflow(context: Arc<ToolContext>, input: OwnedWorkflowRef) -> Result<ToolOutput, ToolError> {
    let workflow = context.automation.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    Ok(ToolOutput::raw(&workflow))
}

async fn create_workflow(context: Arc<ToolContext>, input: CreateAutomationWorkflowInput) -> Result<ToolOutput, ToolError> {
    let owner_tag = ownership_tag(&input.agent_id);
    let created = context
        .automation
        .create_workflow(NewWorkflow {
            name: input.name.clone(),
            nodes: input.nodes,
            connections: input.connections,
            settings: input.settings.map(Value::Object),
            tags: vec![owner_tag.clone()],
        })
        .await?;

    let tagged = is_owned_by(&created, &input.agent_id);
    if !tagged {
        debug!(agent_id = %input.agent_id, "created n8n workflow came back without the ownership tag");
    }
    let mut text = format!(
        "Workflow \"{}\" created\n\nID: {}\nStatus: inactive",
        input.name,
        workflow_id_of(&created, "-")
    );
    if tagged {
        text.push_str(&format!("\nOwner tag: {owner_tag}"));
    } else {
        text.push_str(&format!("\nWarning: the {owner_tag} tag could not be attached; other tools will refuse this workflow"));
    }
    Ok(ToolOutput::text(text))
}

async fn update_workflow(context: Arc<ToolContext>, input: UpdateAutomationWorkflowInput) -> Result<ToolOutput, ToolError> {
    let client: &N8nClient = &context.automation;
    client.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    let body = request_body(&format!("/workflows/{}", input.workflow_id), &input)?;
    let updated = client.update_workflow(&input.workflow_id, &body).await?;
    let name = updated
        .get("name")
        .and_then(Value::as_str)
        .or(input.name.as_deref())
        .unwrap_or(&input.workflow_id);
    Ok(ToolOutput::text(format!("Workflow \"{name}\" updated")))
}

async fn delete_workflow(context: Arc<ToolContext>, input: OwnedWorkflowRef) -> Result<ToolOutput, ToolError> {
    context.automation.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    context.automation.delete_workflow(&input.workflow_id).await?;
    Ok(ToolOutput::text(format!("Workflow {} deleted", input.workflow_id)))
}

async fn activate_workflow(context: Arc<ToolContext>, input: OwnedWorkflowRef) -> Result<ToolOutput, ToolError> {
    context.automation.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    context.automation.activate_workflow(&input.workflow_id).await?;
    Ok(ToolOutput::text(format!("Workflow {} activated", input.workflow_id)))
}

async fn deactivate_workflow(context: Arc<ToolContext>, input: OwnedWorkflowRef) -> Result<ToolOutput, ToolError> {
    context.automation.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    context.automation.deactivate_workflow(&input.workflow_id).await?;
    Ok(ToolOutput::text(format!("Workflow {} deactivated", input.workflow_id)))
}

async fn execute_workflow(context: Arc<ToolContext>, input: ExecuteAutomationWorkflowInput) -> Result<ToolOutput, ToolError> {
    context.automation.ensure_owned(&input.workflow_id, &input.agent_id).await?;
    let data = input.data.unwrap_or_else(|| json!({}));
    let result = context.automation.execute_workflow(&input.workflow_id, data).await?;
    Ok(ToolOutput::text(format!(
        "Workflow {} executed\n\n{}",
        input.workflow_id,
        pretty(&result)
    )))
}

async fn list_executions(context: Arc<ToolContext>, input: ListExecutionsInput) -> Result<ToolOutput, ToolError> {
    let filter = ExecutionFilter {
        workflow_id: input.workflow_id,
        limit: input.limit,
        status: input.status.map(|status| status.as_str().to_string()),
    };
    let executions = context.automation.list_executions(&filter).await?;
    let lines = executions
        .iter()
        .map(|raw| {
            let execution: Execution = serde_json::from_value(raw.clone()).unwrap_or_default();
            format!(
                "• {}: {} (workflow {}) started {}",
                scalar_label(execution.id.as_ref()),
                or_dash(execution.status.as_deref()),
                scalar_label(execution.workflow_id.as_ref()),
                or_dash(execution.started_at.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} executions:", executions.len()),
        lines,
        "No executions found",
    )))
}

/// Execution ids are numbers on some engine versions and strings on others.
fn scalar_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => "-".to_string(),
    }
}

async fn get_execution(context: Arc<ToolContext>, input: ExecutionRef) -> Result<ToolOutput, ToolError> {
    let execution = context.automation.get_execution(&input.execution_id).await?;
    Ok(ToolOutput::raw(&execution))
}

async fn list_credentials(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let credentials = context.automation.list_credentials().await?;
    let lines = credentials
        .iter()
        .map(|raw| {
            let credential: Credential = serde_json::from_value(raw.clone()).unwrap_or_default();
            format!(
                "• {} [{}] ({})",
                or_dash(credential.name.as_deref()),
                or_dash(credential.kind.as_deref()),
                or_dash(credential.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} credentials:", credentials.len()),
        lines,
        "No credentials configured",
    )))
}

async fn get_webhook_url(context: Arc<ToolContext>, input: WebhookUrlInput) -> Result<ToolOutput, ToolError> {
    let url = if input.test.unwrap_or(false) {
        context.automation.test_webhook_url(&input.workflow_id)
    } else {
        context.automation.webhook_url(&input.workflow_id)
    };
    Ok(ToolOutput::text(url))
}
