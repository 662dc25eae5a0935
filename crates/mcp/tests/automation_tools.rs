use serde_json::{Map, Value, json};
use voiceforge_api::{ClientConfig, VoiceForgeClient};
use voiceforge_mcp::{ToolContext, ToolOutput, ToolRegistry};
use voiceforge_n8n::{N8nAuth, N8nClient, N8nConfig};
use voiceforge_testing::StubUpstream;

fn registry_for(stub: &StubUpstream) -> ToolRegistry {
    let platform = VoiceForgeClient::new(ClientConfig::new(stub.url(), "vf_test")).expect("platform client");
    let automation = N8nClient::new(N8nConfig {
        base_url: format!("{}/api/v1", stub.url()),
        api_key: "n8n_test".to_string(),
        auth: N8nAuth::ApiKeyHeader,
    })
    .expect("n8n client");
    ToolRegistry::with_default_catalog(ToolContext::new(platform, automation))
}

async fn call(registry: &ToolRegistry, name: &str, value: Value) -> ToolOutput {
    let arguments = match value {
        Value::Object(map) => Some(map),
        _ => None::<Map<String, Value>>,
    };
    registry.call(name, arguments).await
}

fn foreign_workflow() -> Value {
    json!({ "id": "w1", "name": "Billing sync", "active": true, "tags": [{ "id": "t9", "name": "agent:other" }] })
}

fn owned_workflow() -> Value {
    json!({ "id": "w1", "name": "Lead intake", "active": false, "tags": [{ "id": "t1", "name": "agent:a1" }] })
}

#[tokio::test]
async fn mutations_on_foreign_workflows_are_denied_without_side_effects() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, foreign_workflow());
    let registry = registry_for(&stub);

    for tool in ["n8n_delete_workflow", "n8n_activate_workflow", "n8n_deactivate_workflow", "n8n_execute_workflow"] {
        let output = call(&registry, tool, json!({ "agentId": "a1", "workflowId": "w1" })).await;
        assert!(output.is_error, "{tool}");
        assert!(output.text.starts_with("Access denied:"), "{tool}: {}", output.text);
        let details = output.details.expect("structured error");
        assert_eq!(details["error_code"], "ACCESS_DENIED");
        assert_eq!(details["category"], "access_denied");
    }

    let output = call(
        &registry,
        "n8n_update_workflow",
        json!({ "agentId": "a1", "workflowId": "w1", "name": "Hijacked" }),
    )
    .await;
    assert!(output.text.starts_with("Access denied:"));

    assert!(stub.mutating_requests().is_empty());
    assert_eq!(stub.requests_to("GET", "/api/v1/workflows/w1").len(), 5);
    stub.stop().await;
}

#[tokio::test]
async fn reading_a_foreign_workflow_is_denied() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, foreign_workflow());
    let registry = registry_for(&stub);

    let output = call(&registry, "n8n_get_workflow", json!({ "agentId": "a1", "workflowId": "w1" })).await;

    assert!(output.is_error);
    assert!(!output.text.contains("Billing sync"));
    stub.stop().await;
}

#[tokio::test]
async fn owned_workflow_is_activated_after_the_check() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, owned_workflow());
    stub.respond("POST", "/api/v1/workflows/w1/activate", 200, json!({ "id": "w1", "active": true }));
    let registry = registry_for(&stub);

    let output = call(&registry, "n8n_activate_workflow", json!({ "agentId": "a1", "workflowId": "w1" })).await;

    assert!(!output.is_error, "{}", output.text);
    assert_eq!(output.text, "Workflow w1 activated");
    let methods: Vec<String> = stub.requests().into_iter().map(|request| request.method).collect();
    assert_eq!(methods, vec!["GET", "POST"]);
    assert_eq!(stub.requests()[1].header("x-n8n-api-key"), Some("n8n_test"));
    stub.stop().await;
}

#[tokio::test]
async fn execute_wraps_input_data() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, owned_workflow());
    stub.respond("POST", "/api/v1/workflows/w1/execute", 200, json!({ "executionId": "e1" }));
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "n8n_execute_workflow",
        json!({ "agentId": "a1", "workflowId": "w1", "data": { "phone": "+39061234567" } }),
    )
    .await;

    assert!(output.text.starts_with("Workflow w1 executed"));
    assert!(output.text.contains("e1"));
    let posts = stub.requests_to("POST", "/api/v1/workflows/w1/execute");
    assert_eq!(posts[0].body, Some(json!({ "data": { "phone": "+39061234567" } })));
    stub.stop().await;
}

#[tokio::test]
async fn update_sends_only_supplied_fields() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, owned_workflow());
    stub.respond("PATCH", "/api/v1/workflows/w1", 200, json!({ "id": "w1", "name": "Lead intake v2" }));
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "n8n_update_workflow",
        json!({ "agentId": "a1", "workflowId": "w1", "name": "Lead intake v2" }),
    )
    .await;

    assert_eq!(output.text, "Workflow \"Lead intake v2\" updated");
    let patches = stub.requests_to("PATCH", "/api/v1/workflows/w1");
    assert_eq!(patches[0].body, Some(json!({ "name": "Lead intake v2" })));
    stub.stop().await;
}

#[tokio::test]
async fn created_workflows_are_tagged_for_the_agent() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 200, json!({ "data": [{ "id": "t1", "name": "agent:a1" }] }));
    stub.respond(
        "POST",
        "/api/v1/workflows",
        200,
        json!({ "id": "w7", "name": "Lead intake", "tags": [{ "id": "t1", "name": "agent:a1" }] }),
    );
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "n8n_create_workflow",
        json!({ "agentId": "a1", "name": "Lead intake", "nodes": [], "connections": {} }),
    )
    .await;

    assert!(!output.is_error, "{}", output.text);
    assert!(output.text.contains("w7"));
    assert!(output.text.contains("Owner tag: agent:a1"));
    let posts = stub.requests_to("POST", "/api/v1/workflows");
    let body = posts[0].body.clone().expect("json body");
    assert_eq!(body["tags"], json!([{ "id": "t1" }]));
    assert_eq!(body["settings"], json!({}));
    assert!(stub.requests_to("POST", "/api/v1/tags").is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn listing_for_an_agent_filters_by_tag() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/api/v1/workflows",
        200,
        json!({ "data": [owned_workflow(), { "id": "w2", "name": "Billing sync", "tags": [] }], "nextCursor": null }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "n8n_list_workflows", json!({ "agentId": "a1" })).await;

    assert!(output.text.starts_with("Found 1 workflows:"));
    assert!(output.text.contains("Lead intake"));
    assert!(!output.text.contains("Billing sync"));
    let query = stub.requests()[0].query_pairs();
    assert_eq!(query, vec![("tags".to_string(), "agent:a1".to_string())]);
    stub.stop().await;
}

#[tokio::test]
async fn execution_limit_is_bounded() {
    let stub = StubUpstream::start().await;
    let registry = registry_for(&stub);

    let output = call(&registry, "n8n_list_executions", json!({ "limit": 500 })).await;

    assert!(output.is_error);
    assert!(output.text.contains("$.limit"));
    assert!(stub.requests().is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn webhook_url_is_built_without_any_request() {
    let stub = StubUpstream::start().await;
    let registry = registry_for(&stub);

    let production = call(&registry, "n8n_get_webhook_url", json!({ "workflowId": "w1" })).await;
    let test = call(&registry, "n8n_get_webhook_url", json!({ "workflowId": "w1", "test": true })).await;

    assert_eq!(production.text, format!("{}/webhook/w1", stub.url()));
    assert_eq!(test.text, format!("{}/webhook-test/w1", stub.url()));
    assert!(stub.requests().is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn ownership_follows_the_caller_supplied_agent_id() {
    // The check trusts the agentId argument: a caller naming the owning
    // agent passes it regardless of who it really is.
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, foreign_workflow());
    stub.respond("DELETE", "/api/v1/workflows/w1", 200, json!({ "id": "w1" }));
    let registry = registry_for(&stub);

    let output = call(&registry, "n8n_delete_workflow", json!({ "agentId": "other", "workflowId": "w1" })).await;

    assert!(!output.is_error, "{}", output.text);
    assert_eq!(stub.requests_to("DELETE", "/api/v1/workflows/w1").len(), 1);
    stub.stop().await;
}
