//! Tool registry and dispatch.
//!
//! Every tool is a typed input struct plus an async handler. Registration
//! generates the input schema from the struct; dispatch validates raw
//! arguments against that schema, decodes them into the struct, runs the
//! input's own semantic checks and only then calls the handler. Whatever
//! happens, [`ToolRegistry::call`] returns a [`ToolOutput`].

mod input;
mod output;

pub use input::ToolInput;
pub use output::ToolOutput;

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use rmcp::model::Tool;
use serde_json::{Map, Value};
use tracing::warn;
use voiceforge_api::VoiceForgeClient;
use voiceforge_n8n::N8nClient;

use crate::server::schemas::input_schema_for;
use crate::types::{ToolDefinition, ToolError, ToolSpec};

/// Read-only dependencies handed to every tool handler.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub platform: VoiceForgeClient,
    pub automation: N8nClient,
}

impl ToolContext {
    pub fn new(platform: VoiceForgeClient, automation: N8nClient) -> Self {
        Self { platform, automation }
    }
}

/// A tool that can be listed and invoked by name.
#[async_trait]
pub trait RegisteredTool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// Validates `arguments` and runs the handler.
    async fn invoke(&self, context: Arc<ToolContext>, arguments: Map<String, Value>) -> Result<ToolOutput, ToolError>;
}

struct TypedTool<I, F> {
    definition: ToolDefinition,
    handler: F,
    _input: PhantomData<fn() -> I>,
}

#[async_trait]
impl<I, F, Fut> RegisteredTool for TypedTool<I, F>
where
    I: ToolInput,
    F: Fn(Arc<ToolContext>, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
{
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, context: Arc<ToolContext>, arguments: Map<String, Value>) -> Result<ToolOutput, ToolError> {
        let input = input::decode_arguments::<I>(&self.definition, arguments)?;
        (self.handler)(context, input).await
    }
}

/// Insertion-ordered lookup table of tools.
pub struct ToolRegistry {
    tools: IndexMap<&'static str, Arc<dyn RegisteredTool>>,
    context: Arc<ToolContext>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new(context: ToolContext) -> Self {
        Self {
            tools: IndexMap::new(),
            context: Arc::new(context),
        }
    }

    /// A registry holding the full VoiceForge and n8n tool catalogue.
    pub fn with_default_catalog(context: ToolContext) -> Self {
        let mut registry = Self::new(context);
        crate::tools::register_all(&mut registry);
        registry
    }

    /// Registers `handler` under `spec.name`, replacing any previous tool of
    /// the same name.
    pub fn register<I, F, Fut>(&mut self, spec: ToolSpec, handler: F)
    where
        I: ToolInput,
        F: Fn(Arc<ToolContext>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let definition = ToolDefinition::new(spec, input_schema_for::<I>());
        let tool = TypedTool {
            definition,
            handler,
            _input: PhantomData,
        };
        if self.tools.insert(spec.name, Arc::new(tool)).is_some() {
            warn!(tool = spec.name, "tool registered twice; keeping the latest handler");
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name).map(|tool| tool.definition())
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|tool| tool.definition())
    }

    /// The catalogue in the `rmcp` model, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.definitions().map(ToolDefinition::to_tool).collect()
    }

    /// Invokes the tool called `name`.
    ///
    /// Never fails: unknown tools, invalid arguments and upstream errors all
    /// come back as error-flagged outputs.
    pub async fn call(&self, name: &str, arguments: Option<Map<String, Value>>) -> ToolOutput {
        let Some(tool) = self.tools.get(name) else {
            return ToolOutput::failure(name, &ToolError::UnknownTool { name: name.to_string() });
        };
        match tool.invoke(Arc::clone(&self.context), arguments.unwrap_or_default()).await {
            Ok(output) => output,
            Err(error) => ToolOutput::failure(name, &error),
        }
    }
}
