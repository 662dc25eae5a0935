//! `verify`: checks that the configured key can read the main endpoints.
//!
//! Only GET requests are made. Endpoints scoped to an agent use the first
//! agent of the account and are skipped when there is none.

use voiceforge_api::{ApiError, VoiceForgeClient};
use voiceforge_types::{Agent, decode_list};
use voiceforge_util::build_path;

const ACCOUNT_ENDPOINTS: &[(&str, &str)] = &[
    ("Analytics", "/api/analytics"),
    ("Voices", "/api/voices"),
    ("Phone numbers", "/api/phone/numbers"),
    ("Teams", "/api/teams"),
    ("API keys", "/api/api-keys"),
    ("Integrations", "/api/integrations"),
];

const AGENT_ENDPOINTS: &[(&str, &str)] = &[
    ("Agent", "/api/agents/{agentId}"),
    ("Agent tools", "/api/agents/{agentId}/tools"),
    ("Knowledge", "/api/agents/{agentId}/knowledge"),
    ("Calendar events", "/api/agents/{agentId}/calendar"),
    ("Calendar users", "/api/agents/{agentId}/calendar/users"),
    ("Webhooks", "/api/agents/{agentId}/webhooks"),
    ("Workflows", "/api/agents/{agentId}/workflows"),
    ("Widget", "/api/agents/{agentId}/widget"),
];

#[derive(Debug)]
pub struct EndpointCheck {
    pub name: &'static str,
    pub path: String,
    pub result: Result<(), String>,
}

#[derive(Debug, Default)]
pub struct VerifyReport {
    checks: Vec<EndpointCheck>,
    notes: Vec<String>,
}

impl VerifyReport {
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|check| check.result.is_err()).count()
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .checks
            .iter()
            .map(|check| match &check.result {
                Ok(()) => format!("ok    {:<16} GET {}", check.name, check.path),
                Err(reason) => format!("FAIL  {:<16} GET {}: {reason}", check.name, check.path),
            })
            .collect();
        lines.extend(self.notes.iter().cloned());
        lines.push(format!("{} of {} endpoints reachable", self.len() - self.failures(), self.len()));
        lines.join("\n")
    }

    fn record(&mut self, name: &'static str, path: String, result: Result<serde_json::Value, ApiError>) -> Option<serde_json::Value> {
        let (result, payload) = match result {
            Ok(payload) => (Ok(()), Some(payload)),
            Err(error) => (Err(error.to_string()), None),
        };
        self.checks.push(EndpointCheck { name, path, result });
        payload
    }
}

pub async fn run(client: &VoiceForgeClient) -> VerifyReport {
    let mut report = VerifyReport::default();

    let agents = report.record("Agents", "/api/agents".to_string(), client.get("/api/agents").await);
    let agent_id = agents
        .as_ref()
        .map(|payload| decode_list::<Agent>(payload, "agents"))
        .and_then(|agents| agents.into_iter().find_map(|agent| agent.id));

    for &(name, path) in ACCOUNT_ENDPOINTS {
        let result = client.get(path).await;
        report.record(name, path.to_string(), result);
    }

    match agent_id {
        Some(agent_id) => {
            for &(name, template) in AGENT_ENDPOINTS {
                let path = build_path(template, &[("agentId", agent_id.as_str())]);
                let result = client.get(&path).await;
                report.record(name, path, result);
            }
        }
        None => report
            .notes
            .push("skipped agent endpoints: the account has no agents".to_string()),
    }

    report
}
