//! Metadata describing a tool exposed by this server.
//!
//! A [`ToolDefinition`] is everything `tools/list` publishes about a tool:
//! name, title, description, generated input schema and behaviour hints. The
//! conversion into the `rmcp` model happens in one place, [`ToolDefinition::to_tool`].

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool as RmcpTool, ToolAnnotations};
use serde_json::Value;

/// What a tool does to upstream state. Published as MCP tool annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolHint {
    /// Only reads upstream state.
    ReadOnly,
    /// Creates or modifies upstream records.
    Write,
    /// Deletes upstream records.
    Destructive,
}

impl ToolHint {
    fn annotations(self, title: &str, open_world: bool) -> ToolAnnotations {
        let mut annotations = ToolAnnotations::with_title(title);
        annotations.read_only_hint = Some(self == ToolHint::ReadOnly);
        annotations.destructive_hint = Some(self == ToolHint::Destructive);
        if self == ToolHint::Destructive {
            annotations.idempotent_hint = Some(true);
        }
        annotations.open_world_hint = Some(open_world);
        annotations
    }
}

/// Static description of a tool, supplied at registration.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub hint: ToolHint,
    /// `false` for tools that never reach the network.
    pub open_world: bool,
}

impl ToolSpec {
    pub const fn read_only(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ToolHint::ReadOnly)
    }

    pub const fn write(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ToolHint::Write)
    }

    pub const fn destructive(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ToolHint::Destructive)
    }

    const fn new(name: &'static str, description: &'static str, hint: ToolHint) -> Self {
        Self {
            name,
            description,
            hint,
            open_world: true,
        }
    }

    pub const fn local(mut self) -> Self {
        self.open_world = false;
        self
    }
}

/// A registered tool's published metadata.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub title: String,
    pub description: &'static str,
    pub hint: ToolHint,
    pub open_world: bool,
    input_schema: Arc<JsonObject>,
    schema_value: Value,
}

impl ToolDefinition {
    pub fn new(spec: ToolSpec, input_schema: JsonObject) -> Self {
        Self {
            name: spec.name,
            title: humanize_tool_name(spec.name),
            description: spec.description,
            hint: spec.hint,
            open_world: spec.open_world,
            schema_value: Value::Object(input_schema.clone()),
            input_schema: Arc::new(input_schema),
        }
    }

    /// Input schema as a JSON value, for validation.
    pub fn schema(&self) -> &Value {
        &self.schema_value
    }

    pub fn to_tool(&self) -> RmcpTool {
        let mut tool = RmcpTool::new(self.name, self.description, Arc::clone(&self.input_schema));
        tool.title = Some(self.title.clone());
        tool.annotations = Some(self.hint.annotations(&self.title, self.open_world));
        tool
    }
}

/// `n8n_list_workflows` becomes `N8n list workflows`.
fn humanize_tool_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut characters = spaced.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
