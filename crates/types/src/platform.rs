//! Records owned by the VoiceForge platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An AI agent configured on the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Agent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub llm_model: Option<String>,
    pub temperature: Option<f64>,
    pub system_prompt: Option<String>,
    pub first_message: Option<String>,
}

/// A knowledge base document attached to an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeBase {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
}

/// A callable tool configured on an agent (calendar actions, webhooks, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentTool {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub config: Option<Value>,
    pub parameters: Option<Value>,
    pub is_enabled: Option<bool>,
}

/// An appointment on an agent's calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// A person who can be booked through an agent's calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub availability: Option<Value>,
}

/// An outbound webhook subscription for agent events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Webhook {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub event: Option<String>,
    pub secret: Option<String>,
    pub enabled: Option<bool>,
}

/// A workflow defined on the platform itself (not the automation engine).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformWorkflow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<Value>,
    pub status: Option<String>,
    pub trigger: Option<Value>,
    pub nodes: Option<Vec<Value>>,
    pub edges: Option<Vec<Value>>,
}

/// Tuning parameters of a synthesized voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    pub stability: Option<f64>,
    pub similarity_boost: Option<f64>,
    pub style: Option<f64>,
}

/// A text-to-speech voice. Voices are global, not agent scoped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Voice {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub settings: Option<VoiceSettings>,
}

/// A third-party integration configured for the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Integration {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub config: Option<Map<String, Value>>,
    pub enabled: Option<bool>,
}

/// API key metadata.
///
/// The secret value is only present in the creation response and can never
/// be retrieved again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiKey {
    pub id: Option<String>,
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub enabled: Option<bool>,
    pub created_at: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneNumber {
    pub id: Option<String>,
    pub number: Option<String>,
    pub agent_id: Option<String>,
}

/// Reply to a chat message.
///
/// Older deployments answer with `response`, newer ones with
/// `message.content`; both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatReply {
    pub response: Option<String>,
    pub message: Option<ChatMessage>,
    pub conversation_id: Option<String>,
}

/// The `message` field of a chat reply: either bare text or an object
/// carrying `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatMessage {
    Text(String),
    Content { content: Option<String> },
}

impl ChatMessage {
    pub fn text(&self) -> Option<&str> {
        match self {
            ChatMessage::Text(text) => Some(text.as_str()),
            ChatMessage::Content { content } => content.as_deref(),
        }
    }
}

impl ChatReply {
    /// Returns the assistant text regardless of which reply shape was used.
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .or_else(|| self.message.as_ref().and_then(ChatMessage::text))
    }
}
