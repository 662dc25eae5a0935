//! Server configuration.
//!
//! Everything is read from the process environment once at startup; see
//! [`ServerConfig::from_env`] for the variables involved.

mod io;
mod model;

pub use io::{load_config, load_config_with};
pub use model::{
    ConfigError, N8N_API_KEY_ENV, N8N_AUTH_SCHEME_ENV, N8N_BASE_URL_ENV, ServerConfig, VOICEFORGE_API_KEY_ENV, VOICEFORGE_URL_ENV,
    VOICEFORGE_USER_AGENT_ENV,
};
