//! n8n automation engine client.
//!
//! The engine has its own base URL and credential, separate from the
//! VoiceForge platform. Requests go through the same executor as the
//! platform client ([`voiceforge_api::execute_json`]), so status handling,
//! empty bodies and malformed bodies behave identically.
//!
//! Agent scoping is layered on top with tags; see [`ownership`].

mod config;
mod error;
pub mod ownership;

pub use config::{DEFAULT_N8N_BASE_URL, N8nAuth, N8nConfig};
pub use error::N8nError;
pub use ownership::{is_owned_by, ownership_tag, workflow_tag_names};

use reqwest::header::HeaderName;
use reqwest::{Client, Method, header};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use voiceforge_api::{build_json_headers, execute_json, normalize_base_url};
use voiceforge_types::Tag;
use voiceforge_util::{build_path, build_query_pairs};

const API_VERSION_SUFFIX: &str = "/api/v1";
const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Filters for [`N8nClient::list_workflows`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub active: Option<bool>,
    /// Tag names or ids, sent comma-joined.
    pub tags: Vec<String>,
}

/// Filters for [`N8nClient::list_executions`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub workflow_id: Option<String>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

/// Payload for [`N8nClient::create_workflow`].
///
/// `tags` are tag names; they are resolved to ids before the workflow is
/// created.
#[derive(Debug, Clone, Default)]
pub struct NewWorkflow {
    pub name: String,
    pub nodes: Vec<Value>,
    pub connections: Map<String, Value>,
    pub settings: Option<Value>,
    pub tags: Vec<String>,
}

#[derive(Serialize)]
struct TagId {
    id: String,
}

#[derive(Debug, Clone)]
pub struct N8nClient {
    base_url: String,
    http: Client,
}

impl N8nClient {
    pub fn new(config: N8nConfig) -> Result<Self, N8nError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let authorization = if config.api_key.trim().is_empty() {
            None
        } else {
            Some(match config.auth {
                N8nAuth::Bearer => (header::AUTHORIZATION, format!("Bearer {}", config.api_key)),
                N8nAuth::ApiKeyHeader => (HeaderName::from_static(API_KEY_HEADER), config.api_key.clone()),
            })
        };
        let default_headers = build_json_headers(authorization, None, &[])?;
        let http = Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(voiceforge_api::ApiError::from)?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, method: Method, path: &str, query: &[(String, String)], body: Option<&Value>) -> Result<Value, N8nError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building n8n request");
        let mut request_builder = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }
        Ok(execute_json(request_builder, &method, path).await?)
    }

    async fn list(&self, path: &str, query: &[(String, String)]) -> Result<Vec<Value>, N8nError> {
        let payload = self.send(Method::GET, path, query, None).await?;
        unwrap_list(payload)
    }

    // ============ Tags ============

    pub async fn list_tags(&self) -> Result<Vec<Tag>, N8nError> {
        let items = self.list("/tags", &[]).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag, N8nError> {
        let payload = self.send(Method::POST, "/tags", &[], Some(&json!({ "name": name }))).await?;
        serde_json::from_value(payload).map_err(|error| N8nError::UnexpectedResponse(format!("tag payload: {error}")))
    }

    /// Returns the id of the tag called `name`, creating it when missing.
    ///
    /// Lists then creates, so two concurrent callers may both create the
    /// tag; the engine decides whether the second creation fails.
    pub async fn ensure_tag(&self, name: &str) -> Result<String, N8nError> {
        let existing = self.list_tags().await?;
        if let Some(id) = existing
            .into_iter()
            .find(|tag| tag.name.as_deref() == Some(name))
            .and_then(|tag| tag.id)
        {
            return Ok(id);
        }

        let created = self.create_tag(name).await?;
        created
            .id
            .ok_or_else(|| N8nError::UnexpectedResponse(format!("created tag '{name}' has no id")))
    }

    // ============ Workflows ============

    pub async fn list_workflows(&self, filter: &WorkflowFilter) -> Result<Vec<Value>, N8nError> {
        let mut query = Map::new();
        if let Some(active) = filter.active {
            query.insert("active".into(), Value::Bool(active));
        }
        if !filter.tags.is_empty() {
            query.insert("tags".into(), Value::String(filter.tags.join(",")));
        }
        self.list("/workflows", &build_query_pairs(&query)).await
    }

    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value, N8nError> {
        self.send(Method::GET, &workflow_path(workflow_id, ""), &[], None).await
    }

    /// Creates a workflow after resolving each tag name to an id.
    ///
    /// Tags that cannot be resolved are skipped with a warning; the workflow
    /// is still created.
    pub async fn create_workflow(&self, workflow: NewWorkflow) -> Result<Value, N8nError> {
        let mut tag_ids = Vec::with_capacity(workflow.tags.len());
        for tag in &workflow.tags {
            match self.ensure_tag(tag).await {
                Ok(id) => tag_ids.push(TagId { id }),
                Err(error) => warn!(tag = %tag, error = %error, "could not resolve n8n tag, skipping"),
            }
        }

        let mut body = Map::new();
        body.insert("name".into(), Value::String(workflow.name));
        body.insert("nodes".into(), Value::Array(workflow.nodes));
        body.insert("connections".into(), Value::Object(workflow.connections));
        body.insert("settings".into(), workflow.settings.unwrap_or_else(|| json!({})));
        if !tag_ids.is_empty() {
            body.insert("tags".into(), json!(tag_ids));
        }

        self.send(Method::POST, "/workflows", &[], Some(&Value::Object(body))).await
    }

    pub async fn update_workflow(&self, workflow_id: &str, updates: &Value) -> Result<Value, N8nError> {
        self.send(Method::PATCH, &workflow_path(workflow_id, ""), &[], Some(updates)).await
    }

    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<Value, N8nError> {
        self.send(Method::DELETE, &workflow_path(workflow_id, ""), &[], None).await
    }

    pub async fn activate_workflow(&self, workflow_id: &str) -> Result<Value, N8nError> {
        self.send(Method::POST, &workflow_path(workflow_id, "/activate"), &[], None).await
    }

    pub async fn deactivate_workflow(&self, workflow_id: &str) -> Result<Value, N8nError> {
        self.send(Method::POST, &workflow_path(workflow_id, "/deactivate"), &[], None).await
    }

    // ============ Executions ============

    /// Runs a workflow with `data` as its input, sent as `{"data": ...}`.
    pub async fn execute_workflow(&self, workflow_id: &str, data: Value) -> Result<Value, N8nError> {
        let body = json!({ "data": data });
        self.send(Method::POST, &workflow_path(workflow_id, "/execute"), &[], Some(&body)).await
    }

    pub async fn get_execution(&self, execution_id: &str) -> Result<Value, N8nError> {
        let path = build_path("/executions/{executionId}", &[("executionId", execution_id)]);
        self.send(Method::GET, &path, &[], None).await
    }

    pub async fn list_executions(&self, filter: &ExecutionFilter) -> Result<Vec<Value>, N8nError> {
        let mut query = Map::new();
        if let Some(workflow_id) = &filter.workflow_id {
            query.insert("workflowId".into(), Value::String(workflow_id.clone()));
        }
        if let Some(limit) = filter.limit {
            query.insert("limit".into(), Value::from(limit));
        }
        if let Some(status) = &filter.status {
            query.insert("status".into(), Value::String(status.clone()));
        }
        self.list("/executions", &build_query_pairs(&query)).await
    }

    // ============ Credentials ============

    pub async fn list_credentials(&self) -> Result<Vec<Value>, N8nError> {
        self.list("/credentials", &[]).await
    }

    // ============ Webhooks ============

    /// Production webhook URL of a workflow. No request is made.
    pub fn webhook_url(&self, workflow_id: &str) -> String {
        format!("{}/webhook/{}", self.origin(), workflow_id)
    }

    /// Test-mode webhook URL of a workflow. No request is made.
    pub fn test_webhook_url(&self, workflow_id: &str) -> String {
        format!("{}/webhook-test/{}", self.origin(), workflow_id)
    }

    /// Webhooks are served from the engine root, not the versioned API root.
    fn origin(&self) -> &str {
        self.base_url.strip_suffix(API_VERSION_SUFFIX).unwrap_or(&self.base_url)
    }

    // ============ Ownership ============

    /// Fetches a workflow and checks it carries `agent:<agent_id>`.
    ///
    /// Returns the fetched workflow on success so callers that only read it
    /// need no second request. See [`ownership`] for the limits of this check.
    pub async fn ensure_owned(&self, workflow_id: &str, agent_id: &str) -> Result<Value, N8nError> {
        let workflow = self.get_workflow(workflow_id).await?;
        if is_owned_by(&workflow, agent_id) {
            return Ok(workflow);
        }
        warn!(workflow_id = %workflow_id, agent_id = %agent_id, "n8n workflow ownership check failed");
        Err(N8nError::AccessDenied {
            workflow_id: workflow_id.to_string(),
            agent_id: agent_id.to_string(),
        })
    }
}

fn workflow_path(workflow_id: &str, suffix: &str) -> String {
    format!("{}{}", build_path("/workflows/{workflowId}", &[("workflowId", workflow_id)]), suffix)
}

/// List endpoints wrap results in `{"data": [...], "nextCursor": ...}`;
/// bare arrays are accepted too.
fn unwrap_list(payload: Value) -> Result<Vec<Value>, N8nError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(N8nError::UnexpectedResponse("expected a list or a `data` array".to_string())),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(N8nError::UnexpectedResponse("expected a list or a `data` array".to_string())),
    }
}
