//! `setup-calendar-tools`: gives an agent the calendar tools it needs to book
//! appointments during a conversation.
//!
//! Existing tools are matched by name. Disabled ones are re-enabled, missing
//! ones are created, enabled ones are left alone.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tracing::{info, warn};
use voiceforge_api::VoiceForgeClient;
use voiceforge_types::{AgentTool, decode_envelope, decode_list};
use voiceforge_util::build_path;

const AGENT_PATH: &str = "/api/agents/{agentId}";
const AGENT_TOOLS_PATH: &str = "/api/agents/{agentId}/tools";
const AGENT_TOOL_PATH: &str = "/api/agents/{agentId}/tools/{toolId}";

/// The calendar tools, as sent to `POST /api/agents/{agentId}/tools`.
pub fn calendar_tool_definitions(agent_id: &str) -> Vec<Value> {
    vec![
        json!({
            "name": "create_appointment",
            "description": "Book a new appointment on the calendar. Requires a title and an ISO 8601 start time.",
            "type": "calendar",
            "config": { "agentId": agent_id, "action": "create_appointment" },
            "parameters": {
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Appointment title" },
                    "startTime": { "type": "string", "description": "ISO 8601 start, e.g. 2026-01-14T10:00:00" },
                    "endTime": { "type": "string", "description": "ISO 8601 end" },
                    "description": { "type": "string" },
                    "contactName": { "type": "string" },
                    "contactPhone": { "type": "string" },
                    "contactEmail": { "type": "string" }
                },
                "required": ["title", "startTime"]
            }
        }),
        json!({
            "name": "check_availability",
            "description": "Check calendar availability on a given date.",
            "type": "calendar",
            "config": { "agentId": agent_id, "action": "check_availability" },
            "parameters": {
                "type": "object",
                "properties": {
                    "date": { "type": "string", "description": "Date to check (YYYY-MM-DD)" }
                },
                "required": ["date"]
            }
        }),
        json!({
            "name": "list_appointments",
            "description": "List existing appointments for today or this week.",
            "type": "calendar",
            "config": { "agentId": agent_id, "action": "list_appointments" },
            "parameters": {
                "type": "object",
                "properties": {
                    "period": { "type": "string", "enum": ["today", "week"], "description": "Period to show" }
                }
            }
        }),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetupStep {
    AlreadyEnabled { name: String, tool_id: String },
    Enable { name: String, tool_id: String },
    Create { name: String, definition: Value },
}

impl SetupStep {
    fn name(&self) -> &str {
        match self {
            SetupStep::AlreadyEnabled { name, .. } | SetupStep::Enable { name, .. } | SetupStep::Create { name, .. } => name,
        }
    }
}

/// Decides what to do for each calendar tool given the agent's current tools.
///
/// An existing tool without an id cannot be patched, so it is treated as
/// missing.
pub fn plan_calendar_tools(agent_id: &str, existing: &[AgentTool]) -> Vec<SetupStep> {
    calendar_tool_definitions(agent_id)
        .into_iter()
        .map(|definition| {
            let name = definition["name"].as_str().unwrap_or_default().to_string();
            let current = existing
                .iter()
                .find(|tool| tool.name.as_deref() == Some(name.as_str()))
                .and_then(|tool| tool.id.clone().map(|id| (id, tool.is_enabled)));
            match current {
                Some((tool_id, Some(false))) => SetupStep::Enable { name, tool_id },
                Some((tool_id, _)) => SetupStep::AlreadyEnabled { name, tool_id },
                None => SetupStep::Create { name, definition },
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct SetupOutcome {
    lines: Vec<String>,
    failures: usize,
}

impl SetupOutcome {
    fn ok(&mut self, line: String) {
        self.lines.push(format!("ok    {line}"));
    }

    fn failed(&mut self, line: String) {
        self.failures += 1;
        self.lines.push(format!("FAIL  {line}"));
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            let _ = writeln!(text, "{line}");
        }
        text.trim_end().to_string()
    }
}

/// Lists the agent's tools, then enables or creates each calendar tool.
///
/// Failing to list tools aborts; failures on individual tools are recorded
/// and the remaining tools are still processed.
pub async fn ensure_calendar_tools(client: &VoiceForgeClient, agent_id: &str, llm_model: Option<&str>) -> Result<SetupOutcome> {
    let mut outcome = SetupOutcome::default();

    if let Some(model) = llm_model {
        let path = build_path(AGENT_PATH, &[("agentId", agent_id)]);
        match client.patch(&path, &json!({ "llmModel": model })).await {
            Ok(_) => outcome.ok(format!("agent model set to {model}")),
            Err(error) => {
                warn!(agent_id, error = %error, "could not update agent model");
                outcome.failed(format!("agent model: {error}"));
            }
        }
    }

    let tools_path = build_path(AGENT_TOOLS_PATH, &[("agentId", agent_id)]);
    let payload = client
        .get(&tools_path)
        .await
        .with_context(|| format!("could not list the tools of agent {agent_id}"))?;
    let existing: Vec<AgentTool> = decode_list(&payload, "tools");

    for step in plan_calendar_tools(agent_id, &existing) {
        let name = step.name().to_string();
        match step {
            SetupStep::AlreadyEnabled { tool_id, .. } => outcome.ok(format!("{name} already enabled ({tool_id})")),
            SetupStep::Enable { tool_id, .. } => {
                let path = build_path(AGENT_TOOL_PATH, &[("agentId", agent_id), ("toolId", tool_id.as_str())]);
                match client.patch(&path, &json!({ "isEnabled": true })).await {
                    Ok(_) => {
                        info!(agent_id, tool = %name, "enabled calendar tool");
                        outcome.ok(format!("{name} enabled ({tool_id})"));
                    }
                    Err(error) => outcome.failed(format!("{name}: {error}")),
                }
            }
            SetupStep::Create { definition, .. } => match client.post(&tools_path, &definition).await {
                Ok(created) => {
                    let id = decode_envelope::<AgentTool>(&created, "tool")
                        .and_then(|tool| tool.id)
                        .unwrap_or_else(|| "-".to_string());
                    info!(agent_id, tool = %name, "created calendar tool");
                    outcome.ok(format!("{name} created ({id})"));
                }
                Err(error) => outcome.failed(format!("{name}: {error}")),
            },
        }
    }

    Ok(outcome)
}
