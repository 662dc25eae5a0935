use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use voiceforge_types::{Webhook, decode_list};
use voiceforge_util::{SchemaViolation, build_path};

use super::common::{AgentRef, decode_record, enabled_label, or_dash, render_list, request_body, require_changes};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const WEBHOOKS_PATH: &str = "/api/agents/{agentId}/webhooks";
const WEBHOOK_PATH: &str = "/api/agents/{agentId}/webhooks/{webhookId}";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    /// Endpoint that receives the event payloads.
    #[schemars(url)]
    pub url: String,
    /// Event to subscribe to, e.g. call.completed or appointment.created.
    #[schemars(length(min = 1))]
    pub event: String,
    /// Shared secret used to sign deliveries.
    pub secret: Option<String>,
    pub enabled: Option<bool>,
}

impl ToolInput for CreateWebhookInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub webhook_id: String,
    pub name: Option<String>,
    #[schemars(url)]
    pub url: Option<String>,
    pub event: Option<String>,
    pub secret: Option<String>,
    pub enabled: Option<bool>,
}

impl ToolInput for UpdateWebhookInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(
            self.name.is_some()
                || self.url.is_some()
                || self.event.is_some()
                || self.secret.is_some()
                || self.enabled.is_some(),
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRef {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub webhook_id: String,
}

impl ToolInput for WebhookRef {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_webhooks", "List the webhooks an agent delivers events to."),
        list_webhooks,
    );
    registry.register(
        ToolSpec::write("create_webhook", "Subscribe an external URL to an agent event."),
        create_webhook,
    );
    registry.register(
        ToolSpec::write("update_webhook", "Update a webhook. Only the fields you pass are changed."),
        update_webhook,
    );
    registry.register(
        ToolSpec::destructive("delete_webhook", "Delete a webhook subscription."),
        delete_webhook,
    );
}

async fn list_webhooks(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(WEBHOOKS_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    let webhooks: Vec<Webhook> = decode_list(&payload, "webhooks");
    let lines = webhooks
        .iter()
        .map(|webhook| {
            format!(
                "• {} [{}] -> {} - {} ({})",
                or_dash(webhook.name.as_deref()),
                or_dash(webhook.event.as_deref()),
                or_dash(webhook.url.as_deref()),
                enabled_label(webhook.enabled),
                or_dash(webhook.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} webhooks:", webhooks.len()),
        lines,
        "No webhooks configured for this agent",
    )))
}

async fn create_webhook(context: Arc<ToolContext>, input: CreateWebhookInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(WEBHOOKS_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let webhook: Webhook = decode_record(&payload, "webhook");
    Ok(ToolOutput::text(format!(
        "Webhook \"{}\" created\n\nID: {}\nEvent: {}\nURL: {}",
        webhook.name.as_deref().unwrap_or(&input.name),
        or_dash(webhook.id.as_deref()),
        webhook.event.as_deref().unwrap_or(&input.event),
        webhook.url.as_deref().unwrap_or(&input.url)
    )))
}

async fn update_webhook(context: Arc<ToolContext>, input: UpdateWebhookInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        WEBHOOK_PATH,
        &[("agentId", input.agent_id.as_str()), ("webhookId", input.webhook_id.as_str())],
    );
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let webhook: Webhook = decode_record(&payload, "webhook");
    Ok(ToolOutput::text(format!(
        "Webhook \"{}\" updated",
        webhook.name.as_deref().unwrap_or(&input.webhook_id)
    )))
}

async fn delete_webhook(context: Arc<ToolContext>, input: WebhookRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        WEBHOOK_PATH,
        &[("agentId", input.agent_id.as_str()), ("webhookId", input.webhook_id.as_str())],
    );
    context.platform.delete(&path).await?;
    Ok(ToolOutput::text(format!("Webhook {} deleted", input.webhook_id)))
}
