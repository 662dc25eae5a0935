use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use voiceforge_types::{ApiKey, decode_list};
use voiceforge_util::build_path;

use super::common::{NoArguments, decode_record, enabled_label, or_dash, render_list, request_body};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const API_KEYS_PATH: &str = "/api/api-keys";
const API_KEY_PATH: &str = "/api/api-keys/{keyId}";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyInput {
    /// Label that identifies where the key is used.
    #[schemars(length(min = 1))]
    pub name: String,
}

impl ToolInput for CreateApiKeyInput {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRef {
    #[schemars(length(min = 1))]
    pub key_id: String,
}

impl ToolInput for ApiKeyRef {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only(
            "list_api_keys",
            "List the API keys of the account. Only the key prefix is shown, never the secret.",
        ),
        list_api_keys,
    );
    registry.register(
        ToolSpec::write(
            "create_api_key",
            "Create an API key. The secret is returned once and cannot be retrieved later.",
        ),
        create_api_key,
    );
    registry.register(
        ToolSpec::destructive(
            "delete_api_key",
            "Revoke an API key. Clients using it stop working immediately.",
        ),
        delete_api_key,
    );
}

async fn list_api_keys(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(API_KEYS_PATH).await?;
    let keys: Vec<ApiKey> = decode_list(&payload, "apiKeys");
    let lines = keys
        .iter()
        .map(|key| {
            format!(
                "• {} ({}...) - {}, created {} ({})",
                or_dash(key.name.as_deref()),
                or_dash(key.prefix.as_deref()),
                enabled_label(key.enabled),
                or_dash(key.created_at.as_deref()),
                or_dash(key.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} API keys:", keys.len()),
        lines,
        "No API keys found",
    )))
}

async fn create_api_key(context: Arc<ToolContext>, input: CreateApiKeyInput) -> Result<ToolOutput, ToolError> {
    let body = request_body(API_KEYS_PATH, &input)?;
    let payload = context.platform.post(API_KEYS_PATH, &body).await?;
    let key: ApiKey = decode_record(&payload, "apiKey");
    let mut text = format!(
        "API key \"{}\" created\n\nID: {}",
        key.name.as_deref().unwrap_or(&input.name),
        or_dash(key.id.as_deref())
    );
    match key.key.as_deref() {
        Some(secret) => text.push_str(&format!(
            "\nKey: {secret}\n\nStore this key now. It will not be shown again."
        )),
        None => text.push_str("\n\nThe platform did not return the secret value."),
    }
    Ok(ToolOutput::text(text))
}

async fn delete_api_key(context: Arc<ToolContext>, input: ApiKeyRef) -> Result<ToolOutput, ToolError> {
    context
        .platform
        .delete(&build_path(API_KEY_PATH, &[("keyId", input.key_id.as_str())]))
        .await?;
    Ok(ToolOutput::text(format!("API key {} revoked", input.key_id)))
}
