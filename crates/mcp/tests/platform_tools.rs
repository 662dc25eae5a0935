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
        auth: N8nAuth::Bearer,
    })
    .expect("n8n client");
    ToolRegistry::with_default_catalog(ToolContext::new(platform, automation))
}

fn arguments(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

async fn call(registry: &ToolRegistry, name: &str, value: Value) -> ToolOutput {
    registry.call(name, arguments(value)).await
}

#[tokio::test]
async fn create_agent_posts_exactly_the_supplied_fields() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/agents",
        201,
        json!({ "agent": { "id": "a1", "name": "Support", "language": "it-IT", "llmModel": "gpt-4o-mini" } }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "create_agent", json!({ "name": "Support", "systemPrompt": "Be helpful" })).await;

    assert!(!output.is_error, "{}", output.text);
    assert!(output.text.contains("a1"));
    assert!(output.text.contains("gpt-4o-mini"));
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].body, Some(json!({ "name": "Support", "systemPrompt": "Be helpful" })));
    assert_eq!(requests[0].header("authorization"), Some("Bearer vf_test"));
    stub.stop().await;
}

#[tokio::test]
async fn schema_violations_never_reach_the_upstream() {
    let stub = StubUpstream::start().await;
    let registry = registry_for(&stub);

    let output = call(&registry, "create_agent", json!({ "name": "Support", "temperature": 3 })).await;

    assert!(output.is_error);
    assert!(output.text.starts_with("Error: invalid arguments for create_agent"));
    assert!(output.text.contains("$.systemPrompt"));
    assert!(output.text.contains("$.temperature"));
    let details = output.details.expect("structured error");
    assert_eq!(details["error_code"], "INVALID_ARGUMENTS");
    assert_eq!(details["violations"].as_array().map(Vec::len), Some(2));
    assert!(stub.requests().is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn update_agent_omits_absent_and_null_fields() {
    let stub = StubUpstream::start().await;
    stub.respond("PATCH", "/api/agents/a1", 200, json!({ "agent": { "id": "a1", "name": "Support" } }));
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "update_agent",
        json!({ "agentId": "a1", "temperature": 0.2, "description": null }),
    )
    .await;

    assert!(!output.is_error, "{}", output.text);
    assert_eq!(output.text, "Agent \"Support\" updated");
    let patches = stub.requests_to("PATCH", "/api/agents/a1");
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, Some(json!({ "temperature": 0.2 })));
    stub.stop().await;
}

#[tokio::test]
async fn update_without_changes_is_rejected_locally() {
    let stub = StubUpstream::start().await;
    let registry = registry_for(&stub);

    let output = call(&registry, "update_webhook", json!({ "agentId": "a1", "webhookId": "h1" })).await;

    assert!(output.is_error);
    assert!(output.text.contains("[min_properties]"));
    assert!(stub.requests().is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn not_found_message_is_surfaced() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/agents/missing", 404, json!({ "error": "not found" }));
    let registry = registry_for(&stub);

    let output = call(&registry, "get_agent", json!({ "agentId": "missing" })).await;

    assert!(output.is_error);
    assert!(output.text.contains("not found"));
    let details = output.details.expect("structured error");
    assert_eq!(details["context"]["status"], 404);
    assert_eq!(details["retryable"], false);
    stub.stop().await;
}

#[tokio::test]
async fn non_json_error_body_is_reported_verbatim() {
    let stub = StubUpstream::start().await;
    stub.respond_text("GET", "/api/agents", 502, "upstream proxy unavailable");
    let registry = registry_for(&stub);

    let output = call(&registry, "list_agents", json!({})).await;

    assert!(output.is_error);
    assert!(output.text.contains("upstream proxy unavailable"));
    stub.stop().await;
}

#[tokio::test]
async fn validation_error_body_without_message_field_is_surfaced() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/agents",
        422,
        json!({ "errors": [{ "field": "name", "message": "name is required" }] }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "create_agent", json!({ "name": "Receptionist", "systemPrompt": "Be brief." })).await;

    assert!(output.is_error);
    assert!(output.text.contains("name is required"), "{}", output.text);
    assert!(output.text.contains("HTTP 422"));
    stub.stop().await;
}

#[tokio::test]
async fn list_agents_defaults_missing_language() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "GET",
        "/api/agents",
        200,
        json!({ "agents": [
            { "id": "a1", "name": "Support", "language": "en-US" },
            { "id": "a2", "name": "Booking" }
        ] }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "list_agents", json!({})).await;

    assert_eq!(
        output.text,
        "Found 2 agents:\n\n• Support (a1) - en-US\n• Booking (a2) - it-IT"
    );
    stub.stop().await;
}

#[tokio::test]
async fn empty_calendar_is_a_successful_result() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/agents/a1/calendar", 200, json!({ "events": [] }));
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "list_calendar_events",
        json!({ "agentId": "a1", "startDate": "2026-01-14", "view": "week" }),
    )
    .await;

    assert!(!output.is_error, "{}", output.text);
    assert!(output.text.contains("0 events"));
    let requests = stub.requests_to("GET", "/api/agents/a1/calendar");
    assert_eq!(requests.len(), 1);
    let query = requests[0].query_pairs();
    assert!(query.contains(&("startDate".to_string(), "2026-01-14".to_string())));
    assert!(query.contains(&("view".to_string(), "week".to_string())));
    assert!(!query.iter().any(|(name, _)| name == "agentId"));
    stub.stop().await;
}

#[tokio::test]
async fn calendar_event_ending_before_it_starts_is_rejected() {
    let stub = StubUpstream::start().await;
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "create_calendar_event",
        json!({
            "agentId": "a1",
            "title": "Visit",
            "startTime": "2026-01-14T10:00:00",
            "endTime": "2026-01-14T09:00:00"
        }),
    )
    .await;

    assert!(output.is_error);
    assert!(output.text.contains("$.endTime [time_order]"));
    assert!(stub.requests().is_empty());
    stub.stop().await;
}

#[tokio::test]
async fn knowledge_text_is_posted_with_its_type() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/agents/a1/knowledge",
        201,
        json!({ "knowledgeBase": { "id": "k1", "name": "FAQ", "type": "text" } }),
    );
    let registry = registry_for(&stub);

    let output = call(
        &registry,
        "add_knowledge_text",
        json!({ "agentId": "a1", "name": "FAQ", "content": "Opening hours: 9-18" }),
    )
    .await;

    assert_eq!(output.text, "Knowledge base \"FAQ\" created");
    let posts = stub.requests_to("POST", "/api/agents/a1/knowledge");
    assert_eq!(
        posts[0].body,
        Some(json!({ "name": "FAQ", "content": "Opening hours: 9-18", "type": "text" }))
    );
    stub.stop().await;
}

#[tokio::test]
async fn chat_reply_carries_the_conversation_id() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/agents/a1/chat",
        200,
        json!({ "response": "Ciao! Come posso aiutarti?", "conversationId": "c9" }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "chat", json!({ "agentId": "a1", "message": "Ciao" })).await;

    assert_eq!(output.text, "Ciao! Come posso aiutarti?\n\n[Conversation: c9]");
    let posts = stub.requests_to("POST", "/api/agents/a1/chat");
    assert_eq!(posts[0].body, Some(json!({ "message": "Ciao" })));
    stub.stop().await;
}

#[tokio::test]
async fn chat_reply_with_plain_text_message_is_accepted() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/agents/a1/chat",
        200,
        json!({ "message": "Certo, a che ora?", "conversationId": "c3" }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "chat", json!({ "agentId": "a1", "message": "Vorrei prenotare" })).await;

    assert!(!output.is_error, "{}", output.text);
    assert_eq!(output.text, "Certo, a che ora?\n\n[Conversation: c3]");
    stub.stop().await;
}

#[tokio::test]
async fn created_api_key_secret_is_flagged_as_one_time() {
    let stub = StubUpstream::start().await;
    stub.respond(
        "POST",
        "/api/api-keys",
        201,
        json!({ "apiKey": { "id": "k1", "name": "CI", "key": "vf_secret123" } }),
    );
    let registry = registry_for(&stub);

    let output = call(&registry, "create_api_key", json!({ "name": "CI" })).await;

    assert!(output.text.contains("vf_secret123"));
    assert!(output.text.contains("will not be shown again"));
    stub.stop().await;
}

#[tokio::test]
async fn get_operations_return_the_unwrapped_record() {
    let stub = StubUpstream::start().await;
    stub.respond("GET", "/api/teams/t1", 200, json!({ "team": { "id": "t1", "name": "Sales" } }));
    let registry = registry_for(&stub);

    let output = call(&registry, "get_team", json!({ "teamId": "t1" })).await;

    let parsed: Value = serde_json::from_str(&output.text).expect("pretty JSON");
    assert_eq!(parsed, json!({ "id": "t1", "name": "Sales" }));
    stub.stop().await;
}
