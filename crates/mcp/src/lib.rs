//! Model Context Protocol (MCP) server exposing the VoiceForge platform.
//!
//! The platform REST API (agents, knowledge bases, calendar, webhooks,
//! voices and the rest) and the embedded n8n automation engine are published
//! as MCP tools over stdio. Each tool is a typed input struct, a JSON schema
//! generated from it and an async handler making one or two upstream calls.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voiceforge_mcp::{ServerConfig, ToolRegistry, serve_stdio};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let registry = ToolRegistry::with_default_catalog(config.build_context()?);
//! serve_stdio(Arc::new(registry)).await
//! # }
//! ```

pub mod config;
pub mod registry;
pub mod server;
mod tools;
pub mod types;

pub use config::{ConfigError, ServerConfig, load_config};
pub use registry::{RegisteredTool, ToolContext, ToolInput, ToolOutput, ToolRegistry};
pub use server::{VoiceForgeMcpCore, serve_stdio};
pub use types::{ToolDefinition, ToolError, ToolHint, ToolSpec};
