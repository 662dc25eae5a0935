//! Helpers for building tool-call log payloads.
//!
//! Payload shaping and redaction live here so every logged call goes through
//! the same secret scrubbing before it reaches the subscriber.

use serde_json::{Map, Value};
use voiceforge_util::{redact_sensitive, truncate_for_summary};

use crate::registry::ToolOutput;

const MAX_LOGGED_PAYLOAD_CHARS: usize = 2_000;

/// Builds the standard log payload for one tool call.
///
/// The payload includes `request` when arguments were supplied and always
/// includes `response` with the rendered text and error flag.
pub(crate) fn build_log_payload(arguments: Option<&Map<String, Value>>, output: &ToolOutput) -> Value {
    let mut payload = Map::new();
    if let Some(arguments) = arguments {
        payload.insert("request".to_string(), Value::Object(arguments.clone()));
    }
    payload.insert(
        "response".to_string(),
        serde_json::json!({
            "text": output.text,
            "isError": output.is_error,
        }),
    );
    Value::Object(payload)
}

/// Serializes `payload` for a log line with secrets scrubbed and the length
/// capped.
pub(crate) fn render_log_payload(payload: &Value) -> String {
    truncate_for_summary(&redact_sensitive(&payload.to_string()), MAX_LOGGED_PAYLOAD_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_carries_request_and_response() {
        let arguments = json!({ "agentId": "a1" });
        let payload = build_log_payload(arguments.as_object(), &ToolOutput::text("ok"));
        assert_eq!(payload["request"]["agentId"], "a1");
        assert_eq!(payload["response"]["text"], "ok");
        assert_eq!(payload["response"]["isError"], false);
    }

    #[test]
    fn request_is_omitted_without_arguments() {
        let payload = build_log_payload(None, &ToolOutput::text("ok"));
        assert!(payload.get("request").is_none());
    }

    #[test]
    fn rendered_payload_redacts_secrets() {
        let arguments = json!({ "name": "Orders", "secret": "whsec_live_123456" });
        let rendered = render_log_payload(&build_log_payload(arguments.as_object(), &ToolOutput::text("ok")));
        assert!(!rendered.contains("whsec_live_123456"));
        assert!(rendered.contains("Orders"));
    }
}
