use std::fmt;
use std::str::FromStr;

/// Development default; real deployments set `N8N_BASE_URL`.
pub const DEFAULT_N8N_BASE_URL: &str = "http://localhost:5678/api/v1";

/// How the API key is presented to the automation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum N8nAuth {
    /// `Authorization: Bearer <key>`, used with JWT-style keys.
    #[default]
    Bearer,
    /// `X-N8N-API-KEY: <key>`, the engine's native API key header.
    ApiKeyHeader,
}

impl FromStr for N8nAuth {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(N8nAuth::Bearer),
            "api-key" | "apikey" | "x-n8n-api-key" => Ok(N8nAuth::ApiKeyHeader),
            other => Err(format!("unknown auth scheme '{other}'; expected 'bearer' or 'api-key'")),
        }
    }
}

impl fmt::Display for N8nAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            N8nAuth::Bearer => f.write_str("bearer"),
            N8nAuth::ApiKeyHeader => f.write_str("api-key"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct N8nConfig {
    /// API root including the version segment, e.g. `https://n8n.example.com/api/v1`.
    pub base_url: String,
    /// Empty means no auth header is sent.
    pub api_key: String,
    pub auth: N8nAuth,
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_N8N_BASE_URL.to_string(),
            api_key: String::new(),
            auth: N8nAuth::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_scheme_parses_known_names() {
        assert_eq!("bearer".parse::<N8nAuth>().unwrap(), N8nAuth::Bearer);
        assert_eq!(" API-KEY ".parse::<N8nAuth>().unwrap(), N8nAuth::ApiKeyHeader);
        assert_eq!("x-n8n-api-key".parse::<N8nAuth>().unwrap(), N8nAuth::ApiKeyHeader);
        assert!("basic".parse::<N8nAuth>().is_err());
    }

    #[test]
    fn default_config_points_at_local_engine() {
        let config = N8nConfig::default();
        assert_eq!(config.base_url, "http://localhost:5678/api/v1");
        assert!(config.api_key.is_empty());
        assert_eq!(config.auth, N8nAuth::Bearer);
    }
}
