//! VoiceForge platform API client.
//!
//! This crate provides a lightweight client for the VoiceForge REST API.
//! It focuses on:
//!
//! - Constructing an HTTP client with bearer authentication and JSON headers
//! - Validating the configured base URL
//! - Interpreting responses through the shared [`execute_json`] contract
//!
//! The primary entry point is [`VoiceForgeClient`].
//!
//! # Example
//!
//! ```ignore
//! use voiceforge_api::{ClientConfig, VoiceForgeClient};
//!
//! let client = VoiceForgeClient::new(ClientConfig::new("https://voiceforge.super-chatbot.com", "vf_..."))?;
//! let agents = client.get("/api/agents").await?;
//! ```

mod error;
mod exec;

pub use error::ApiError;
pub use exec::execute_json;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Public VoiceForge deployment used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://voiceforge.super-chatbot.com";

/// Hostnames allowed to use plain `http` without a warning.
const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Connection settings for [`VoiceForgeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Sent as `User-Agent` when set. No value is sent by default.
    pub user_agent: Option<String>,
    /// Additional headers attached to every request.
    pub extra_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            user_agent: None,
            extra_headers: Vec::new(),
        }
    }
}

/// Thin wrapper around a configured `reqwest::Client` for VoiceForge access.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct VoiceForgeClient {
    base_url: String,
    http: Client,
}

impl VoiceForgeClient {
    /// Builds a client from `config`.
    ///
    /// Every request carries `Authorization: Bearer <api_key>`,
    /// `Content-Type: application/json` and `Accept: application/json`, plus
    /// the configured user agent and extra headers.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let default_headers = build_json_headers(
            Some((header::AUTHORIZATION, format!("Bearer {}", config.api_key))),
            config.user_agent.as_deref(),
            &config.extra_headers,
        )?;
        let http = Client::builder().default_headers(default_headers).build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");
        self.http.request(method, url)
    }

    /// Sends one request with an optional JSON body.
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut request_builder = self.request(method.clone(), path);
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }
        execute_json(request_builder, &method, path).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, None).await
    }

    /// GET with query parameters. Empty `query` sends no query string.
    pub async fn get_with_query(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let mut request_builder = self.request(Method::GET, path);
        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }
        execute_json(request_builder, &Method::GET, path).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Validates a base URL and strips trailing slashes.
///
/// Rules:
/// - the URL must parse and use `http` or `https`
/// - a host is required
/// - plain `http` to a non-loopback host is accepted but logged, since the
///   bearer credential then travels unencrypted
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|error| invalid(error.to_string()))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(invalid(format!("unsupported scheme '{scheme}://'; expected http or https")));
    }
    let host = parsed.host_str().ok_or_else(|| invalid("a host is required".to_string()))?;

    if scheme == "http"
        && !LOOPBACK_HOSTS
            .iter()
            .any(|&allowed| host.eq_ignore_ascii_case(allowed))
    {
        warn!(host = %host, "base URL uses plain http for a non-loopback host; credentials are sent unencrypted");
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Builds the default header set for a JSON API client.
///
/// `authorization` is a header name and value pair (bearer or API-key
/// style); its value is marked sensitive so it never appears in debug
/// output. Extra headers are applied last and may override defaults.
pub fn build_json_headers(
    authorization: Option<(HeaderName, String)>,
    user_agent: Option<&str>,
    extra_headers: &[(String, String)],
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    if let Some((name, value)) = authorization {
        let mut header_value = HeaderValue::from_str(&value).map_err(|error| ApiError::InvalidHeader {
            name: name.as_str().to_string(),
            reason: error.to_string(),
        })?;
        header_value.set_sensitive(true);
        headers.insert(name, header_value);
    }

    if let Some(user_agent) = user_agent {
        let value = HeaderValue::from_str(user_agent).map_err(|error| ApiError::InvalidHeader {
            name: header::USER_AGENT.as_str().to_string(),
            reason: error.to_string(),
        })?;
        headers.insert(header::USER_AGENT, value);
    }

    for (name, value) in extra_headers {
        let invalid = |reason: String| ApiError::InvalidHeader {
            name: name.clone(),
            reason,
        };
        let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|error| invalid(error.to_string()))?;
        let header_value = HeaderValue::from_str(value.trim()).map_err(|error| invalid(error.to_string()))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
