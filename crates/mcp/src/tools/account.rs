//! Account-wide resources: analytics, phone numbers and teams.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use voiceforge_types::{PhoneNumber, Team, decode_list};
use voiceforge_util::build_path;

use super::common::{NoArguments, or_dash, render_list, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const ANALYTICS_PATH: &str = "/api/analytics";
const PHONE_NUMBERS_PATH: &str = "/api/phone/numbers";
const TEAMS_PATH: &str = "/api/teams";
const TEAM_PATH: &str = "/api/teams/{teamId}";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    #[schemars(length(min = 1))]
    pub team_id: String,
}

impl ToolInput for TeamRef {}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only("get_analytics", "Get the account analytics dashboard: calls, conversations and usage."),
        get_analytics,
    );
    registry.register(
        ToolSpec::read_only("list_phone_numbers", "List the phone numbers of the account and the agent each one routes to."),
        list_phone_numbers,
    );
    registry.register(ToolSpec::read_only("list_teams", "List the teams of the account."), list_teams);
    registry.register(ToolSpec::read_only("get_team", "Get one team with its members."), get_team);
}

async fn get_analytics(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(ANALYTICS_PATH).await?;
    Ok(ToolOutput::raw(&payload))
}

async fn list_phone_numbers(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(PHONE_NUMBERS_PATH).await?;
    let numbers: Vec<PhoneNumber> = decode_list(&payload, "phoneNumbers");
    let lines = numbers
        .iter()
        .map(|number| {
            format!(
                "• {} -> agent {} ({})",
                or_dash(number.number.as_deref()),
                or_dash(number.agent_id.as_deref()),
                or_dash(number.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} phone numbers:", numbers.len()),
        lines,
        "No phone numbers found",
    )))
}

async fn list_teams(context: Arc<ToolContext>, _input: NoArguments) -> Result<ToolOutput, ToolError> {
    let payload = context.platform.get(TEAMS_PATH).await?;
    let teams: Vec<Team> = decode_list(&payload, "teams");
    let lines = teams
        .iter()
        .map(|team| format!("• {} ({})", or_dash(team.name.as_deref()), or_dash(team.id.as_deref())))
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} teams:", teams.len()),
        lines,
        "No teams found",
    )))
}

async fn get_team(context: Arc<ToolContext>, input: TeamRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(TEAM_PATH, &[("teamId", input.team_id.as_str())]))
        .await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "team")))
}
