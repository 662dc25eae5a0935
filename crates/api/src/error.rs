use thiserror::Error;

/// Failure of a single upstream request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The upstream answered with a non-2xx status.
    #[error("{}", describe_status(.status, .message))]
    Status { status: u16, message: String },

    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response carried a body that is not JSON.
    #[error("upstream returned a non-JSON body (HTTP {status}): {preview}")]
    MalformedBody { status: u16, preview: String },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn describe_status(status: &u16, message: &str) -> String {
    let bare = format!("HTTP {status}");
    if message == bare {
        return bare;
    }
    format!("{message} ({bare})")
}

impl ApiError {
    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::MalformedBody { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same request later could succeed.
    ///
    /// Nothing in this crate retries; callers only surface the hint.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Transport(error) => error.is_timeout() || error.is_connect(),
            _ => false,
        }
    }

    /// Short machine-readable code for structured error payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Status { status: 401, .. } => "UPSTREAM_UNAUTHORIZED",
            ApiError::Status { status: 403, .. } => "UPSTREAM_FORBIDDEN",
            ApiError::Status { status: 404, .. } => "UPSTREAM_NOT_FOUND",
            ApiError::Status { .. } => "UPSTREAM_HTTP_ERROR",
            ApiError::Transport(_) => "UPSTREAM_UNREACHABLE",
            ApiError::MalformedBody { .. } => "UPSTREAM_MALFORMED_BODY",
            ApiError::InvalidHeader { .. } | ApiError::InvalidBaseUrl { .. } => "CLIENT_CONFIGURATION",
        }
    }
}
