//! Quicksearch documentation tool implementation.

use bugzilla_mcp_client::fetch_quicksearch_syntax;
use rmcp::ErrorData as McpError;
use rmcp::model::CallToolResult;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::tools::common::text_result;

/// Fetch the quicksearch help page of the bound server, without credentials.
///
/// # Errors
/// Fails when no backend is bound or the page cannot be fetched.
pub async fn learn_quicksearch_syntax() -> Result<String, ToolError> {
    let bz = current_backend()?;
    // Public documentation: fresh connection, no api_key.
    fetch_quicksearch_syntax(bz.base_url(), bz.options())
        .await
        .map_err(ToolError::Documentation)
}

/// Return the HTML documentation of the quicksearch syntax.
pub async fn handle_learn_quicksearch_syntax() -> Result<CallToolResult, McpError> {
    text_result(learn_quicksearch_syntax().await)
}
