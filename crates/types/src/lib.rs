//! Shared models for records owned by the VoiceForge platform and the n8n
//! automation engine.
//!
//! None of these records are created or mutated locally; they are decoded
//! from upstream responses so tool handlers can render short summaries.
//! Every field is optional because upstream payloads vary between
//! deployments and we never want a missing field to turn a successful call
//! into a decoding failure.

pub mod automation;
pub mod platform;

pub use automation::{AutomationWorkflow, Credential, Execution, Tag, TagRef};
pub use platform::{
    Agent, AgentTool, ApiKey, CalendarEvent, CalendarUser, ChatReply, Integration, KnowledgeBase, PhoneNumber, PlatformWorkflow, Team,
    Voice, VoiceSettings, Webhook,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes the record stored under `key` in an upstream envelope such as
/// `{ "agent": { ... } }`.
///
/// Returns `None` when the key is absent, `null`, or does not match `T`.
pub fn decode_envelope<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    let inner = payload.get(key)?;
    if inner.is_null() {
        return None;
    }
    serde_json::from_value(inner.clone()).ok()
}

/// Decodes the list stored under `key` in an upstream envelope such as
/// `{ "agents": [ ... ] }`.
///
/// A missing or `null` key is an empty list. Individual entries that fail to
/// decode are skipped.
pub fn decode_list<T: DeserializeOwned>(payload: &Value, key: &str) -> Vec<T> {
    let items = match payload.get(key) {
        Some(Value::Array(items)) => items,
        _ => match payload {
            Value::Array(items) => items,
            _ => return Vec::new(),
        },
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}
