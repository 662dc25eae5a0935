use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use voiceforge_types::{Integration, decode_list};
use voiceforge_util::{SchemaViolation, build_path};

use super::common::{NoArguments, decode_record, enabled_label, or_dash, render_list, request_body, require_changes, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const INTEGRATIONS_PATH: &str = "/api/integrations";
const INTEGRATION_PATH: &str = "/api/integrations/{integrationId}";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRef {
    #[schemars(length(min = 1))]
    pub integration_id: String,
}

impl ToolInput for IntegrationRef {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntegrationInput {
    /// Provider kind, e.g. google_calendar, hubspot or twilio.
    #[serde(rename = "type")]
    #[schemars(length(min = 1))]
    pub kind: String,
    #[schemars(length(min = 1))]
    pub name: String,
    /// Provider-specific settings and credentials.
    pub config: Option<Map<String, Value>>,
    pub enabled: Option<bool>,
}

impl ToolInput for CreateIntegrationInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntegrationInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub integration_id: String,
    pub name: Option<String>,
    pub config: Option<Map<String, Value>>,
    pub enabled: Option<bool>,
}

impl ToolInput for UpdateIntegrationInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(self.name.is_some() || self.config.is_some() || self.enabled.is_some())
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("list_integrations", "List the third-party integrations configured for the account."),
        list_integrations,
    );
    registry.register(
        ToolSpec::read_only("get_integration", "Get one integration with its configuration."),
        get_integration,
    );
    registry.register(
        ToolSpec::write("create_integration", "Connect a third-party service to the account."),
        create_integration,
    );
    registry.register(
        ToolSpec::write(
            "update_integration",
            "Update an integration, for example to disable it. Only the fields you pass are changed.",
        ),
        update_integration,
    );
    registry.register(
        ToolSpec::destructive("delete_integration", "Remove an integration from the account."),
        delete_integration,
    );
}

async fn list_integrations(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(INTEGRATIONS_PATH).await?;
    let integrations: Vec<Integration> = decode_list(&payload, "integrations");
    let lines = integrations
        .iter()
        .map(|integration| {
            format!(
                "• {} [{}] - {} ({})",
                or_dash(integration.name.as_deref()),
                or_dash(integration.kind.as_deref()),
                enabled_label(integration.enabled),
                or_dash(integration.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} integrations:", integrations.len()),
        lines,
        "No integrations configured",
    )))
}

async fn get_integration(context: Arc<ToolContext>, input: IntegrationRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(INTEGRATION_PATH, &[("integrationId", input.integration_id.as_str())]))
        .await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "integration")))
}

async fn create_integration(context: Arc<ToolContext>, input: CreateIntegrationInput) -> Result<ToolOutput, ToolError> {
    let body = request_body(INTEGRATIONS_PATH, &input)?;
    let payload = context.platform.post(INTEGRATIONS_PATH, &body).await?;
    let integration: Integration = decode_record(&payload, "integration");
    Ok(ToolOutput::text(format!(
        "Integration \"{}\" created\n\nID: {}\nType: {}",
        integration.name.as_deref().unwrap_or(&input.name),
        or_dash(integration.id.as_deref()),
        integration.kind.as_deref().unwrap_or(&input.kind)
    )))
}

async fn update_integration(context: Arc<ToolContext>, input: UpdateIntegrationInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(INTEGRATION_PATH, &[("integrationId", input.integration_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let integration: Integration = decode_record(&payload, "integration");
    Ok(ToolOutput::text(format!(
        "Integration \"{}\" updated",
        integration.name.as_deref().unwrap_or(&input.integration_id)
    )))
}

async fn delete_integration(context: Arc<ToolContext>, input: IntegrationRef) -> Result<ToolOutput, ToolError> {
    context
        .platform
        .delete(&build_path(INTEGRATION_PATH, &[("integrationId", input.integration_id.as_str())]))
        .await?;
    Ok(ToolOutput::text(format!("Integration {} deleted", input.integration_id)))
}
