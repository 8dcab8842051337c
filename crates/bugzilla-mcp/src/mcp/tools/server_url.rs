//! Server URL tool implementation.

use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::tools::common::text_result;

/// Base URL of the bound Bugzilla server.
///
/// # Errors
/// Fails when no backend is bound.
pub fn server_url() -> Result<String, ToolError> {
    Ok(current_backend()?.base_url().to_owned())
}

/// Return the Bugzilla server's base URL.
pub fn handle_server_url() -> Result<CallToolResult, McpError> {
    text_result(server_url())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gate::{CredentialGate, with_backend};
    use http::{HeaderMap, HeaderValue};

    #[tokio::test]
    async fn returns_normalized_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert("api_key", HeaderValue::from_static("k"));
        headers.insert("bugzilla_url", HeaderValue::from_static("bugzilla.example.com/bz"));
        let client = CredentialGate::default().authorize(Some(&headers)).unwrap();

        let url = with_backend(client, async { server_url() }).await.unwrap();

        assert_eq!(url, "https://bugzilla.example.com/bz");
    }

    #[test]
    fn fails_without_binding() {
        assert!(matches!(server_url(), Err(ToolError::NotInitialized)));
    }
}
