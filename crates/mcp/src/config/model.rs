use thiserror::Error;
use voiceforge_api::{ApiError, ClientConfig, VoiceForgeClient};
use voiceforge_n8n::{N8nClient, N8nConfig, N8nError};

use crate::registry::ToolContext;

pub const VOICEFORGE_API_KEY_ENV: &str = "VOICEFORGE_API_KEY";
pub const VOICEFORGE_URL_ENV: &str = "VOICEFORGE_URL";
pub const VOICEFORGE_USER_AGENT_ENV: &str = "VOICEFORGE_USER_AGENT";
pub const N8N_BASE_URL_ENV: &str = "N8N_BASE_URL";
pub const N8N_API_KEY_ENV: &str = "N8N_API_KEY";
pub const N8N_AUTH_SCHEME_ENV: &str = "N8N_AUTH_SCHEME";

/// Connection settings for both upstreams.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub platform: ClientConfig,
    pub automation: N8nConfig,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        super::load_config()
    }

    /// Adds headers sent on every platform request.
    pub fn with_extra_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.platform.extra_headers.extend(headers);
        self
    }

    /// Builds both HTTP clients.
    pub fn build_context(&self) -> Result<ToolContext, ConfigError> {
        let platform = VoiceForgeClient::new(self.platform.clone())?;
        let automation = N8nClient::new(self.automation.clone())?;
        Ok(ToolContext::new(platform, automation))
    }
}

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{var} is required.\n\nGet your API key from:\n  https://voiceforge.super-chatbot.com/api-keys\n\nThen set the environment variable:\n  export {var}=vf_..."
    )]
    MissingCredential { var: &'static str },

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("Could not build the VoiceForge client: {0}")]
    Client(#[from] ApiError),

    #[error("Could not build the n8n client: {0}")]
    Automation(#[from] N8nError),
}
