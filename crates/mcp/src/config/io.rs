use voiceforge_api::{ClientConfig, DEFAULT_BASE_URL, normalize_base_url};
use voiceforge_n8n::{DEFAULT_N8N_BASE_URL, N8nAuth, N8nConfig};

use super::model::{
    ConfigError, N8N_API_KEY_ENV, N8N_AUTH_SCHEME_ENV, N8N_BASE_URL_ENV, ServerConfig, VOICEFORGE_API_KEY_ENV, VOICEFORGE_URL_ENV,
    VOICEFORGE_USER_AGENT_ENV,
};

/// Loads the configuration from the process environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    load_config_with(|name| std::env::var(name).ok())
}

/// Loads the configuration from an arbitrary variable lookup.
///
/// Blank values count as unset. Only the platform API key is required; the
/// n8n settings fall back to a local development engine.
pub fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> Result<ServerConfig, ConfigError> {
    let read = |name: &str| lookup(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

    let api_key = read(VOICEFORGE_API_KEY_ENV).ok_or(ConfigError::MissingCredential {
        var: VOICEFORGE_API_KEY_ENV,
    })?;
    let base_url = validated_url(VOICEFORGE_URL_ENV, read(VOICEFORGE_URL_ENV).as_deref().unwrap_or(DEFAULT_BASE_URL))?;
    let mut platform = ClientConfig::new(base_url, api_key);
    platform.user_agent = read(VOICEFORGE_USER_AGENT_ENV);

    let auth = match read(N8N_AUTH_SCHEME_ENV) {
        Some(raw) => raw.parse::<N8nAuth>().map_err(|reason| ConfigError::InvalidValue {
            var: N8N_AUTH_SCHEME_ENV,
            reason,
        })?,
        None => N8nAuth::default(),
    };
    let automation = N8nConfig {
        base_url: validated_url(N8N_BASE_URL_ENV, read(N8N_BASE_URL_ENV).as_deref().unwrap_or(DEFAULT_N8N_BASE_URL))?,
        api_key: read(N8N_API_KEY_ENV).unwrap_or_default(),
        auth,
    };

    Ok(ServerConfig { platform, automation })
}

fn validated_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    normalize_base_url(raw).map_err(|error| ConfigError::InvalidValue {
        var,
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ALL_VARS: [&str; 6] = [
        VOICEFORGE_API_KEY_ENV,
        VOICEFORGE_URL_ENV,
        VOICEFORGE_USER_AGENT_ENV,
        N8N_BASE_URL_ENV,
        N8N_API_KEY_ENV,
        N8N_AUTH_SCHEME_ENV,
    ];

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let error = load_config_with(lookup_from(&[])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingCredential { var: "VOICEFORGE_API_KEY" }));

        let error = load_config_with(lookup_from(&[(VOICEFORGE_API_KEY_ENV, "   ")])).unwrap_err();
        assert!(matches!(error, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = load_config_with(lookup_from(&[(VOICEFORGE_API_KEY_ENV, "vf_test")])).unwrap();
        assert_eq!(config.platform.base_url, "https://voiceforge.super-chatbot.com");
        assert_eq!(config.platform.api_key, "vf_test");
        assert!(config.platform.user_agent.is_none());
        assert_eq!(config.automation.base_url, "http://localhost:5678/api/v1");
        assert!(config.automation.api_key.is_empty());
        assert_eq!(config.automation.auth, N8nAuth::Bearer);
    }

    #[test]
    fn overrides_are_read_and_normalized() {
        let config = load_config_with(lookup_from(&[
            (VOICEFORGE_API_KEY_ENV, "vf_test"),
            (VOICEFORGE_URL_ENV, "https://staging.voiceforge.example.com/"),
            (VOICEFORGE_USER_AGENT_ENV, "voiceforge-mcp/1.0.0"),
            (N8N_BASE_URL_ENV, "https://n8n.example.com/api/v1"),
            (N8N_API_KEY_ENV, "n8n_key"),
            (N8N_AUTH_SCHEME_ENV, "api-key"),
        ]))
        .unwrap();
        assert_eq!(config.platform.base_url, "https://staging.voiceforge.example.com");
        assert_eq!(config.platform.user_agent.as_deref(), Some("voiceforge-mcp/1.0.0"));
        assert_eq!(config.automation.base_url, "https://n8n.example.com/api/v1");
        assert_eq!(config.automation.api_key, "n8n_key");
        assert_eq!(config.automation.auth, N8nAuth::ApiKeyHeader);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let error = load_config_with(lookup_from(&[(VOICEFORGE_API_KEY_ENV, "vf_test"), (VOICEFORGE_URL_ENV, "ftp://files")])).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { var: "VOICEFORGE_URL", .. }));

        let error = load_config_with(lookup_from(&[(VOICEFORGE_API_KEY_ENV, "vf_test"), (N8N_AUTH_SCHEME_ENV, "basic")])).unwrap_err();
        assert!(error.to_string().starts_with("Invalid value for N8N_AUTH_SCHEME"));
    }

    #[test]
    fn from_env_reads_the_process_environment() {
        let unset: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|name| (*name, None)).collect();
        temp_env::with_vars(unset, || {
            assert!(matches!(ServerConfig::from_env(), Err(ConfigError::MissingCredential { .. })));
        });

        temp_env::with_vars(
            [(VOICEFORGE_API_KEY_ENV, Some("vf_env")), (N8N_API_KEY_ENV, Some("n8n_env")), (VOICEFORGE_URL_ENV, None)],
            || {
                let config = ServerConfig::from_env().expect("config");
                assert_eq!(config.platform.api_key, "vf_env");
                assert_eq!(config.automation.api_key, "n8n_env");
                assert_eq!(config.platform.base_url, "https://voiceforge.super-chatbot.com");
            },
        );
    }
}
