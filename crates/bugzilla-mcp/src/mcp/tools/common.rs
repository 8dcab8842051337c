//! Shared helpers for MCP tool implementations.

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::error::ToolError;

/// Render a tool outcome as pretty-printed JSON text content.
pub fn json_result<T: Serialize>(outcome: Result<T, ToolError>) -> Result<CallToolResult, McpError> {
    let value = outcome?;
    let json_str =
        serde_json::to_string_pretty(&value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}

/// Render a tool outcome as plain text content.
pub fn text_result(outcome: Result<String, ToolError>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(outcome?)]))
}


#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn json_result_wraps_pretty_json() {
        let result = json_result(Ok(json!({"id": 1}))).unwrap();
        let text = fixtures::result_text(&result);
        assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn tool_errors_become_mcp_errors() {
        let err = text_result(Err(ToolError::NotInitialized)).unwrap_err();
        assert!(err.message.contains("not initialized"));
    }
}
