//! Core types shared by the registry and the server.

pub mod errors;
pub mod tools;

pub use errors::ToolError;
pub use tools::{ToolDefinition, ToolHint, ToolSpec};
