//! # Text Processing Utilities
//!
//! Redaction of credentials before they reach logs, and short summaries of
//! long upstream messages.

use once_cell::sync::Lazy;
use regex::Regex;

/// Redacts values that look like secrets in a string.
///
/// Header values, bearer tokens, VoiceForge API keys (`vf_...`) and
/// `KEY=value` style assignments are replaced with `[REDACTED]` while the
/// key names are preserved for debugging.
///
/// # Example
/// ```rust
/// use voiceforge_util::redact_sensitive;
///
/// let redacted = redact_sensitive("Authorization: Bearer vf_live_abc123");
/// assert_eq!(redacted, "Authorization: [REDACTED]");
///
/// let redacted = redact_sensitive("VOICEFORGE_API_KEY=vf_abc123 other=1");
/// assert_eq!(redacted, "VOICEFORGE_API_KEY=[REDACTED] other=1");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                if captures.get(2).is_some() {
                    format!("{prefix}{replacement}")
                } else {
                    replacement.to_string()
                }
            })
            .to_string();
    }

    redacted
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

/// Ordered from most specific to most general; later patterns see the output
/// of earlier ones.
fn build_redact_patterns() -> Vec<Regex> {
    [
        r"(?i)((?:authorization|x-n8n-api-key):\s+)([^\s]+(?:\s+[^\s,;]+)?)",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(?i)((?:export\s+)?[A-Z0-9_]*?(?:API_KEY|TOKEN|SECRET|PASSWORD)[A-Z0-9_]*\s*=\s*)([^\s]+)",
        "(?i)(\"(?:apiKey|api_key|secret|token|password)\"\\s*:\\s*\")([^\"]+)",
        r"\b(vf_[A-Za-z0-9_\-]{6,})",
        r"(eyJ[A-Za-z0-9\-._~+/]+=*)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
}

/// Trims `text` and shortens it to at most `max_len` characters, ending with
/// `...` when truncated.
pub fn truncate_for_summary(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_len {
        return trimmed.to_string();
    }

    // Reserve space for the trailing ellipsis.
    let target_len = max_len.saturating_sub(3);
    let truncated: String = trimmed.chars().take(target_len).collect();
    format!("{}...", truncated.trim_end())
}
