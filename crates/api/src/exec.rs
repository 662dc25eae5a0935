//! Shared JSON request executor.
//!
//! Both the platform client and the automation-engine client send requests
//! through [`execute_json`], so they share one response contract.

use std::time::Instant;

use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use voiceforge_util::{extract_error_message, redact_sensitive, truncate_response_preview};

use crate::ApiError;

const BODY_PREVIEW_LIMIT: usize = 200;

/// Sends a prepared request and interprets the response.
///
/// - 2xx with an empty body yields `Value::Null`.
/// - 2xx with a JSON body yields the parsed value.
/// - 2xx with any other body yields [`ApiError::MalformedBody`].
/// - non-2xx yields [`ApiError::Status`] carrying the upstream error message.
/// - network failures yield [`ApiError::Transport`].
///
/// Exactly one request is sent; there are no retries.
pub async fn execute_json(request_builder: RequestBuilder, method: &Method, path: &str) -> Result<Value, ApiError> {
    let start = Instant::now();
    debug!(method = %method, path = %path, "http request started");

    let response = request_builder.send().await.map_err(|error| {
        warn!(
            method = %method,
            path = %path,
            error = %redact_sensitive(&error.to_string()),
            duration_ms = start.elapsed().as_millis(),
            "http request failed before a response was received"
        );
        ApiError::Transport(error)
    })?;
    let status = response.status();
    let body_text = response.text().await?;

    if !status.is_success() {
        let message = extract_error_message(&body_text).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        warn!(
            method = %method,
            path = %path,
            status = %status,
            error = %redact_sensitive(&message),
            duration_ms = start.elapsed().as_millis(),
            "http request failed"
        );
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if body_text.trim().is_empty() {
        debug!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed with empty response"
        );
        return Ok(Value::Null);
    }

    let parsed = serde_json::from_str::<Value>(&body_text).map_err(|error| {
        warn!(
            method = %method,
            path = %path,
            status = %status,
            body_len = body_text.len(),
            duration_ms = start.elapsed().as_millis(),
            error = %error,
            "http response JSON parse failed"
        );
        ApiError::MalformedBody {
            status: status.as_u16(),
            preview: truncate_response_preview(&redact_sensitive(&body_text), BODY_PREVIEW_LIMIT),
        }
    })?;
    debug!(
        method = %method,
        path = %path,
        status = %status,
        duration_ms = start.elapsed().as_millis(),
        "http request completed"
    );
    Ok(parsed)
}
