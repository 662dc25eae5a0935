//! Calendar events and bookable calendar users of an agent.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use voiceforge_types::{CalendarEvent, CalendarUser, decode_list};
use voiceforge_util::{SchemaViolation, build_path, is_date_or_timestamp, parse_event_timestamp};

use super::common::{AgentRef, decode_record, or_dash, query_pairs, render_list, request_body, require_changes, unwrap_record};
use crate::registry::{ToolContext, ToolInput, ToolOutput, ToolRegistry};
use crate::types::{ToolError, ToolSpec};

const EVENTS_PATH: &str = "/api/agents/{agentId}/calendar";
const EVENT_PATH: &str = "/api/agents/{agentId}/calendar/{eventId}";
const USERS_PATH: &str = "/api/agents/{agentId}/calendar/users";
const USER_PATH: &str = "/api/agents/{agentId}/calendar/users/{userId}";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    Month,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListCalendarEventsInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    /// Start of the range: YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.
    pub start_date: Option<String>,
    /// End of the range: YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.
    pub end_date: Option<String>,
    /// Predefined range around today, used when no dates are given.
    pub view: Option<CalendarView>,
}

impl ToolInput for ListCalendarEventsInput {
    fn check(&self) -> Vec<SchemaViolation> {
        [("$.startDate", &self.start_date), ("$.endDate", &self.end_date)]
            .into_iter()
            .filter_map(|(path, value)| {
                let value = value.as_deref()?;
                (!is_date_or_timestamp(value))
                    .then(|| SchemaViolation::new(path, "format", "must be a date (YYYY-MM-DD) or a timestamp (YYYY-MM-DDTHH:MM:SS)"))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventRef {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub event_id: String,
}

impl ToolInput for CalendarEventRef {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEventInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub title: String,
    /// ISO 8601 start, e.g. 2026-01-14T10:00:00.
    #[schemars(extend("format" = "date-time"))]
    pub start_time: String,
    /// ISO 8601 end. The platform applies its default duration when omitted.
    #[schemars(extend("format" = "date-time"))]
    pub end_time: Option<String>,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[schemars(email)]
    pub contact_email: Option<String>,
}

impl ToolInput for CreateCalendarEventInput {
    fn check(&self) -> Vec<SchemaViolation> {
        check_event_window(Some(&self.start_time), self.end_time.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarEventInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub event_id: String,
    pub title: Option<String>,
    #[schemars(extend("format" = "date-time"))]
    pub start_time: Option<String>,
    #[schemars(extend("format" = "date-time"))]
    pub end_time: Option<String>,
    /// Event status, e.g. confirmed or cancelled.
    pub status: Option<String>,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[schemars(email)]
    pub contact_email: Option<String>,
}

impl ToolInput for UpdateCalendarEventInput {
    fn check(&self) -> Vec<SchemaViolation> {
        let mut violations = check_event_window(self.start_time.as_deref(), self.end_time.as_deref());
        violations.extend(require_changes(
            self.title.is_some()
                || self.start_time.is_some()
                || self.end_time.is_some()
                || self.status.is_some()
                || self.description.is_some()
                || self.contact_name.is_some()
                || self.contact_phone.is_some()
                || self.contact_email.is_some(),
        ));
        violations
    }
}

/// An event must not end before it starts. Only checked when both ends are
/// known locally and are of the same kind: both offset-qualified or both
/// local.
fn check_event_window(start: Option<&str>, end: Option<&str>) -> Vec<SchemaViolation> {
    let (Some(start), Some(end)) = (start.and_then(parse_event_timestamp), end.and_then(parse_event_timestamp)) else {
        return Vec::new();
    };
    if end < start {
        return vec![SchemaViolation::new("$.endTime", "time_order", "must not be before startTime")];
    }
    Vec::new()
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUserRef {
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub user_id: String,
}

impl ToolInput for CalendarUserRef {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarUserInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[schemars(length(min = 1))]
    pub name: String,
    #[schemars(email)]
    pub email: String,
    /// Role on the calendar, e.g. staff or admin.
    pub role: Option<String>,
    /// Weekly availability, as accepted by the platform.
    pub availability: Option<Value>,
}

impl ToolInput for CreateCalendarUserInput {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarUserInput {
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub agent_id: String,
    #[serde(skip_serializing)]
    #[schemars(length(min = 1))]
    pub user_id: String,
    pub name: Option<String>,
    #[schemars(email)]
    pub email: Option<String>,
    pub role: Option<String>,
    pub availability: Option<Value>,
}

impl ToolInput for UpdateCalendarUserInput {
    fn check(&self) -> Vec<SchemaViolation> {
        require_changes(self.name.is_some() || self.email.is_some() || self.role.is_some() || self.availability.is_some())
    }
}

pub(crate) fn register(registry: &mut ToolRegistry) {
    registry.register(
        ToolSpec::read_only(
            "list_calendar_events",
            "List the calendar events of an agent, optionally within a date range or a day/week/month view.",
        ),
        list_calendar_events,
    );
    registry.register(
        ToolSpec::read_only("get_calendar_event", "Get one calendar event."),
        get_calendar_event,
    );
    registry.register(
        ToolSpec::write(
            "create_calendar_event",
            "Book an event on an agent's calendar. startTime and endTime are ISO 8601 timestamps.",
        ),
        create_calendar_event,
    );
    registry.register(
        ToolSpec::write(
            "update_calendar_event",
            "Reschedule or edit a calendar event. Only the fields you pass are changed.",
        ),
        update_calendar_event,
    );
    registry.register(
        ToolSpec::destructive("delete_calendar_event", "Delete a calendar event."),
        delete_calendar_event,
    );
    registry.register(
        ToolSpec::read_only("list_calendar_users", "List the people that can be booked on an agent's calendar."),
        list_calendar_users,
    );
    registry.register(
        ToolSpec::write("create_calendar_user", "Add a bookable person to an agent's calendar."),
        create_calendar_user,
    );
    registry.register(
        ToolSpec::write(
            "update_calendar_user",
            "Update a calendar user. Only the fields you pass are changed.",
        ),
        update_calendar_user,
    );
    registry.register(
        ToolSpec::destructive("delete_calendar_user", "Remove a person from an agent's calendar."),
        delete_calendar_user,
    );
}

fn describe_event(event: &CalendarEvent) -> String {
    format!(
        "• {}: {} to {} [{}] ({})",
        or_dash(event.title.as_deref()),
        or_dash(event.start_time.as_deref()),
        or_dash(event.end_time.as_deref()),
        or_dash(event.status.as_deref()),
        or_dash(event.id.as_deref())
    )
}

async fn list_calendar_events(context: Arc<ToolContext>, input: ListCalendarEventsInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(EVENTS_PATH, &[("agentId", input.agent_id.as_str())]);
    let query = query_pairs(&path, &input)?;
    let payload = context.platform.get_with_query(&path, &query).await?;
    let events: Vec<CalendarEvent> = decode_list(&payload, "events");
    let lines = events.iter().map(describe_event).collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} events:", events.len()),
        lines,
        "Found 0 events in the requested period",
    )))
}

async fn get_calendar_event(context: Arc<ToolContext>, input: CalendarEventRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        EVENT_PATH,
        &[("agentId", input.agent_id.as_str()), ("eventId", input.event_id.as_str())],
    );
    let payload = context.platform.get(&path).await?;
    Ok(ToolOutput::raw(&unwrap_record(payload, "event")))
}

async fn create_calendar_event(context: Arc<ToolContext>, input: CreateCalendarEventInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(EVENTS_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let event: CalendarEvent = decode_record(&payload, "event");
    Ok(ToolOutput::text(format!(
        "Event \"{}\" created\n\nID: {}\nStart: {}\nEnd: {}",
        event.title.as_deref().unwrap_or(&input.title),
        or_dash(event.id.as_deref()),
        event.start_time.as_deref().unwrap_or(&input.start_time),
        or_dash(event.end_time.as_deref().or(input.end_time.as_deref()))
    )))
}

async fn update_calendar_event(context: Arc<ToolContext>, input: UpdateCalendarEventInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        EVENT_PATH,
        &[("agentId", input.agent_id.as_str()), ("eventId", input.event_id.as_str())],
    );
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let event: CalendarEvent = decode_record(&payload, "event");
    Ok(ToolOutput::text(format!(
        "Event \"{}\" updated",
        event.title.as_deref().unwrap_or(&input.event_id)
    )))
}

async fn delete_calendar_event(context: Arc<ToolContext>, input: CalendarEventRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        EVENT_PATH,
        &[("agentId", input.agent_id.as_str()), ("eventId", input.event_id.as_str())],
    );
    context.platform.delete(&path).await?;
    Ok(ToolOutput::text(format!("Event {} deleted", input.event_id)))
}

async fn list_calendar_users(context: Arc<ToolContext>, input: AgentRef) -> Result<ToolOutput, ToolError> {
    let payload = context
        .platform
        .get(&build_path(USERS_PATH, &[("agentId", input.agent_id.as_str())]))
        .await?;
    let users: Vec<CalendarUser> = decode_list(&payload, "users");
    let lines = users
        .iter()
        .map(|user| {
            format!(
                "• {} <{}> - {} ({})",
                or_dash(user.name.as_deref()),
                or_dash(user.email.as_deref()),
                or_dash(user.role.as_deref()),
                or_dash(user.id.as_deref())
            )
        })
        .collect();
    Ok(ToolOutput::text(render_list(
        &format!("Found {} calendar users:", users.len()),
        lines,
        "No calendar users found",
    )))
}

async fn create_calendar_user(context: Arc<ToolContext>, input: CreateCalendarUserInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(USERS_PATH, &[("agentId", input.agent_id.as_str())]);
    let body = request_body(&path, &input)?;
    let payload = context.platform.post(&path, &body).await?;
    let user: CalendarUser = decode_record(&payload, "user");
    Ok(ToolOutput::text(format!(
        "Calendar user \"{}\" created\n\nID: {}\nEmail: {}",
        user.name.as_deref().unwrap_or(&input.name),
        or_dash(user.id.as_deref()),
        user.email.as_deref().unwrap_or(&input.email)
    )))
}

async fn update_calendar_user(context: Arc<ToolContext>, input: UpdateCalendarUserInput) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        USER_PATH,
        &[("agentId", input.agent_id.as_str()), ("userId", input.user_id.as_str())],
    );
    let body = request_body(&path, &input)?;
    let payload = context.platform.patch(&path, &body).await?;
    let user: CalendarUser = decode_record(&payload, "user");
    Ok(ToolOutput::text(format!(
        "Calendar user \"{}\" updated",
        user.name.as_deref().unwrap_or(&input.user_id)
    )))
}

async fn delete_calendar_user(context: Arc<ToolContext>, input: CalendarUserRef) -> Result<ToolOutput, ToolError> {
    let path = build_path(
        USER_PATH,
        &[("agentId", input.agent_id.as_str()), ("userId", input.user_id.as_str())],
    );
    context.platform.delete(&path).await?;
    Ok(ToolOutput::text(format!("Calendar user {} deleted", input.user_id)))
}
