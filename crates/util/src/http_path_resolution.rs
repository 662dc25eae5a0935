use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Resolves a path template such as `/api/agents/{agentId}/tools/{toolId}`
/// by substituting each `{key}` placeholder with its percent-encoded value.
///
/// Every byte outside `A-Z`, `a-z` and `0-9` is encoded, so identifiers
/// containing `/`, `?` or `#` cannot escape their path segment.
/// Placeholders without a matching variable are left unchanged.
///
/// # Examples
/// ```rust
/// use voiceforge_util::build_path;
///
/// let path = build_path("/api/agents/{agentId}/tools/{toolId}", &[("agentId", "a1"), ("toolId", "t 2")]);
/// assert_eq!(path, "/api/agents/a1/tools/t%202");
/// ```
pub fn build_path(template: &str, variables: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (key, value) in variables {
        let encoded = utf8_percent_encode(value, NON_ALPHANUMERIC).to_string();
        path = path.replace(&format!("{{{key}}}"), &encoded);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::build_path;

    #[test]
    fn build_path_keeps_plain_identifiers() {
        let path = build_path("/api/agents/{agentId}", &[("agentId", "agent123")]);
        assert_eq!(path, "/api/agents/agent123");
    }

    #[test]
    fn build_path_encodes_reserved_bytes() {
        let path = build_path("/api/agents/{agentId}/knowledge", &[("agentId", "../admin?x=1")]);
        assert_eq!(path, "/api/agents/%2E%2E%2Fadmin%3Fx%3D1/knowledge");
    }

    #[test]
    fn build_path_leaves_unknown_placeholders() {
        let path = build_path("/api/agents/{agentId}/events/{eventId}", &[("agentId", "a1")]);
        assert_eq!(path, "/api/agents/a1/events/{eventId}");
    }
}
