use serde::{Deserialize, Serialize};

/// A pending tool invocation requested by a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments, exactly as the model produced them
    pub arguments: String,
}

impl ToolCall {
    pub fn new<I, N, A>(id: I, name: N, arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// The outcome of a previously requested [`ToolCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    #[serde(default)]
    pub content: String,
}

impl ToolResult {
    pub fn new<I: Into<String>, C: Into<String>>(call_id: I, content: C) -> Self {
        ToolResult {
            call_id: call_id.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_wire_form() {
        let call = ToolCall::new("c1", "search_tool", r#"{"query":"VOO"}"#);
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value,
            json!({"id": "c1", "name": "search_tool", "arguments": "{\"query\":\"VOO\"}"})
        );
    }

    #[test]
    fn test_tool_result_content_defaults_to_empty() {
        let result: ToolResult = serde_json::from_value(json!({"call_id": "c1"})).unwrap();
        assert_eq!(result.call_id, "c1");
        assert!(result.content.is_empty());
    }
}
