use serde::{Deserialize, Serialize};

/// A request from the model to invoke a registry function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the model, unique within one assistant turn.
    pub id: String,
    /// Name of the function to invoke.
    pub name: String,
    /// JSON arguments. A string value holds raw arguments the model sent
    /// that were not valid JSON.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// The arguments encoded the way the chat completions API expects them.
    pub fn arguments_json(&self) -> String {
        match &self.arguments {
            serde_json::Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

/// The result returned after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// Serialized JSON payload produced by the function.
    pub content: String,
    /// Whether the payload is a structured error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("call_1", "output");
        assert!(!result.is_error);
        assert_eq!(result.content, "output");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("call_1", "failed");
        assert!(result.is_error);
    }

    #[test]
    fn test_arguments_json_keeps_raw_strings() {
        let call = ToolCall {
            id: "c".into(),
            name: "get_token_balances".into(),
            arguments: serde_json::Value::String("{not json".into()),
        };
        assert_eq!(call.arguments_json(), "{not json");

        let call = ToolCall {
            arguments: serde_json::json!({"address": "0xabc"}),
            ..call
        };
        assert_eq!(call.arguments_json(), r#"{"address":"0xabc"}"#);
    }
}
