use serde_json::{Map, json};
use voiceforge_n8n::{ExecutionFilter, N8nAuth, N8nClient, N8nConfig, N8nError, NewWorkflow, WorkflowFilter};
use voiceforge_testing::StubUpstream;

fn client_for(stub: &StubUpstream, auth: N8nAuth, api_key: &str) -> N8nClient {
    N8nClient::new(N8nConfig {
        base_url: format!("{}/api/v1", stub.url()),
        api_key: api_key.to_string(),
        auth,
    })
    .expect("n8n client")
}

#[tokio::test]
async fn bearer_auth_is_default() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/credentials", 200, json!({ "data": [{ "id": "c1", "name": "Slack", "type": "slackApi" }] }));

    let credentials = client_for(&stub, N8nAuth::Bearer, "jwt-token")
        .list_credentials()
        .await
        .expect("credentials");

    assert_eq!(credentials.len(), 1);
    let request = &stub.requests()[0];
    assert_eq!(request.header("authorization"), Some("Bearer jwt-token"));
    assert!(request.header("x-n8n-api-key").is_none());
    stub.stop().await;
}

#[tokio::test]
async fn api_key_header_auth() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/credentials", 200, json!({ "data": [] }));

    client_for(&stub, N8nAuth::ApiKeyHeader, "n8n_api_abc")
        .list_credentials()
        .await
        .expect("credentials");

    let request = &stub.requests()[0];
    assert_eq!(request.header("x-n8n-api-key"), Some("n8n_api_abc"));
    assert!(request.header("authorization").is_none());
    stub.stop().await;
}

#[tokio::test]
async fn empty_key_sends_no_auth_header() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 200, json!({ "data": [] }));

    client_for(&stub, N8nAuth::Bearer, "").list_tags().await.expect("tags");

    let request = &stub.requests()[0];
    assert!(request.header("authorization").is_none());
    assert!(request.header("x-n8n-api-key").is_none());
    stub.stop().await;
}

#[tokio::test]
async fn ensure_tag_reuses_existing_tag() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 200, json!({ "data": [{ "id": "t1", "name": "agent:a1" }] }));

    let id = client_for(&stub, N8nAuth::Bearer, "k").ensure_tag("agent:a1").await.expect("tag");

    assert_eq!(id, "t1");
    assert!(stub.requests_to("POST", "/api/v1/tags").is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn ensure_tag_creates_missing_tag() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 200, json!({ "data": [{ "id": "t1", "name": "billing" }] }));
    stub.respond("POST", "/api/v1/tags", 200, json!({ "id": "t2", "name": "agent:a1" }));

    let id = client_for(&stub, N8nAuth::Bearer, "k").ensure_tag("agent:a1").await.expect("tag");

    assert_eq!(id, "t2");
    let created = stub.requests_to("POST", "/api/v1/tags");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].body, Some(json!({ "name": "agent:a1" })));
    stub.stop().await;
}

#[tokio::test]
async fn create_workflow_sends_resolved_tag_ids() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 200, json!({ "data": [{ "id": "t1", "name": "agent:a1" }] }));
    stub.respond("POST", "/api/v1/workflows", 200, json!({ "id": "w1", "name": "Lead intake" }));

    let workflow = client_for(&stub, N8nAuth::Bearer, "k")
        .create_workflow(NewWorkflow {
            name: "Lead intake".to_string(),
            nodes: vec![json!({ "name": "Webhook", "type": "n8n-nodes-base.webhook" })],
            connections: Map::new(),
            settings: None,
            tags: vec!["agent:a1".to_string()],
        })
        .await
        .expect("workflow");

    assert_eq!(workflow["id"], "w1");
    let body = stub.requests_to("POST", "/api/v1/workflows")[0].body.clone().expect("json body");
    assert_eq!(body["tags"], json!([{ "id": "t1" }]));
    assert_eq!(body["settings"], json!({}));
    assert_eq!(body["name"], "Lead intake");
    stub.stop().await;
}

#[tokio::test]
async fn create_workflow_skips_unresolvable_tags() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/tags", 500, json!({ "message": "tag service down" }));
    stub.respond("POST", "/api/v1/workflows", 200, json!({ "id": "w1" }));

    client_for(&stub, N8nAuth::Bearer, "k")
        .create_workflow(NewWorkflow {
            name: "Untagged".to_string(),
            tags: vec!["agent:a1".to_string()],
            ..NewWorkflow::default()
        })
        .await
        .expect("workflow is still created");

    let body = stub.requests_to("POST", "/api/v1/workflows")[0].body.clone().expect("json body");
    assert!(body.get("tags").is_none());
    stub.stop().await;
}

#[tokio::test]
async fn list_workflows_passes_filters() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows", 200, json!({ "data": [{ "id": "w1" }], "nextCursor": null }));

    let workflows = client_for(&stub, N8nAuth::Bearer, "k")
        .list_workflows(&WorkflowFilter {
            active: Some(true),
            tags: vec!["agent:a1".to_string()],
        })
        .await
        .expect("workflows");

    assert_eq!(workflows.len(), 1);
    let pairs = stub.requests()[0].query_pairs();
    assert!(pairs.contains(&("active".to_string(), "true".to_string())));
    assert!(pairs.contains(&("tags".to_string(), "agent:a1".to_string())));
    stub.stop().await;
}

#[tokio::test]
async fn list_executions_passes_filters() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/executions", 200, json!({ "data": [] }));

    client_for(&stub, N8nAuth::Bearer, "k")
        .list_executions(&ExecutionFilter {
            workflow_id: Some("w1".to_string()),
            limit: Some(5),
            status: Some("error".to_string()),
        })
        .await
        .expect("executions");

    let pairs = stub.requests()[0].query_pairs();
    assert!(pairs.contains(&("workflowId".to_string(), "w1".to_string())));
    assert!(pairs.contains(&("limit".to_string(), "5".to_string())));
    assert!(pairs.contains(&("status".to_string(), "error".to_string())));
    stub.stop().await;
}

#[tokio::test]
async fn execute_wraps_input_in_data() {
    let stub = StubUpstream::start().await;
    stub.respond("POST", "/api/v1/workflows/w1/execute", 200, json!({ "executionId": "e1" }));

    client_for(&stub, N8nAuth::Bearer, "k")
        .execute_workflow("w1", json!({ "lead": "Anna" }))
        .await
        .expect("execution");

    let body = stub.requests()[0].body.clone();
    assert_eq!(body, Some(json!({ "data": { "lead": "Anna" } })));
    stub.stop().await;
}

#[tokio::test]
async fn ensure_owned_rejects_foreign_workflow() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, json!({ "id": "w1", "tags": [{ "id": "t9", "name": "agent:other" }] }));

    let error = client_for(&stub, N8nAuth::Bearer, "k")
        .ensure_owned("w1", "a1")
        .await
        .unwrap_err();

    assert!(error.is_access_denied());
    assert!(error.to_string().starts_with("Access denied:"));
    assert!(matches!(error, N8nError::AccessDenied { .. }));
    stub.stop().await;
}

#[tokio::test]
async fn ensure_owned_returns_owned_workflow() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/v1/workflows/w1", 200, json!({ "id": "w1", "tags": [{ "id": "t1", "name": "agent:a1" }] }));

    let workflow = client_for(&stub, N8nAuth::Bearer, "k")
        .ensure_owned("w1", "a1")
        .await
        .expect("owned");

    assert_eq!(workflow["id"], "w1");
    assert_eq!(stub.requests().len(), 1);
    stub.stop().await;
}

#[tokio::test]
async fn upstream_errors_are_wrapped() {
    let stub = StubUpstream::start().await;
    stub.respond("DELETE", "/api/v1/workflows/w1", 404, json!({ "message": "Not Found" }));

    let error = client_for(&stub, N8nAuth::Bearer, "k").delete_workflow("w1").await.unwrap_err();

    match error {
        N8nError::Api(api) => assert_eq!(api.status(), Some(404)),
        other => panic!("unexpected error: {other:?}"),
    }
    stub.stop().await;
}
