use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use crate::types::ToolError;

/// Rendered result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
    /// Structured content; set on error results.
    pub details: Option<Value>,
}

impl ToolOutput {
    /// A successful plain-text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            details: None,
        }
    }

    /// A successful result showing `value` pretty-printed.
    pub fn raw(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    /// The error-flagged result for `error` raised by `tool`.
    pub fn failure(tool: &str, error: &ToolError) -> Self {
        let text = match error {
            ToolError::InvalidArguments { tool, violations } => {
                let mut text = format!("Error: invalid arguments for {tool}");
                for violation in violations {
                    text.push_str(&format!("\n- {} [{}]: {}", violation.path, violation.rule, violation.message));
                }
                text
            }
            _ if error.is_access_denied() => error.to_string(),
            _ => format!("Error: {error}"),
        };
        Self {
            text,
            is_error: true,
            details: Some(error.to_error_data(tool)),
        }
    }

    pub fn into_call_tool_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        let mut result = if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        };
        result.structured_content = self.details;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use voiceforge_api::ApiError;
    use voiceforge_util::SchemaViolation;

    #[test]
    fn raw_output_is_pretty_printed() {
        let output = ToolOutput::raw(&json!({ "id": "a1" }));
        assert_eq!(output.text, "{\n  \"id\": \"a1\"\n}");
        assert!(!output.is_error);
    }

    #[test]
    fn failure_lists_each_violation_on_its_own_line() {
        let error = ToolError::invalid_arguments(
            "create_agent",
            vec![
                SchemaViolation::new("$.name", "required", "missing required property"),
                SchemaViolation::new("$.temperature", "maximum", "must be <= 1"),
            ],
        );
        let output = ToolOutput::failure("create_agent", &error);
        assert!(output.is_error);
        assert_eq!(
            output.text,
            "Error: invalid arguments for create_agent\n- $.name [required]: missing required property\n- $.temperature [maximum]: must be <= 1"
        );
    }

    #[test]
    fn upstream_failure_becomes_error_result_with_structured_content() {
        let error = ToolError::from(ApiError::Status {
            status: 404,
            message: "not found".into(),
        });
        let result = ToolOutput::failure("get_agent", &error).into_call_tool_result();

        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.expect("structured content");
        assert_eq!(structured["error_code"], "UPSTREAM_NOT_FOUND");
        let text = serde_json::to_value(&result.content).unwrap().to_string();
        assert!(text.contains("Error: not found (HTTP 404)"));
    }

    #[test]
    fn success_has_no_structured_content() {
        let result = ToolOutput::text("done").into_call_tool_result();
        assert_eq!(result.is_error, Some(false));
        assert!(result.structured_content.is_none());
    }
}
