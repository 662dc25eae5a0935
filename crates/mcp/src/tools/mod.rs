//! The tool catalogue.
//!
//! One module per resource family. Each exposes a `register` function that
//! adds its tools to a [`ToolRegistry`]; [`register_all`] fixes the order
//! in which tools are listed to MCP clients.

mod account;
mod agent_tools;
mod agents;
mod api_keys;
mod calendar;
mod chat;
pub(crate) mod common;
mod integrations;
mod knowledge;
mod n8n;
mod voices;
mod webhooks;
mod workflows;

use crate::registry::ToolRegistry;

pub(crate) fn register_all(registry: &mut ToolRegistry) {
    agents::register(registry);
    knowledge::register(registry);
    chat::register(registry);
    agent_tools::register(registry);
    calendar::register(registry);
    webhooks::register(registry);
    workflows::register(registry);
    voices::register(registry);
    integrations::register(registry);
    api_keys::register(registry);
    account::register(registry);
    n8n::register(registry);
}
