//! Bug info tool implementation.

use bugzilla_mcp_client::BugRecord;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::params::BugInfoParams;
use crate::mcp::tools::common::json_result;

/// Fetch every field of a bug through the bound backend.
///
/// # Errors
/// Fails when no backend is bound or the Bugzilla call fails.
pub async fn bug_info(params: BugInfoParams) -> Result<BugRecord, ToolError> {
    let bz = current_backend()?;
    bz.bug_info(params.id)
        .await
        .map_err(|e| ToolError::backend("Failed to fetch bug info", e))
}

/// Return the entire information about a given bug id.
pub async fn handle_bug_info(Parameters(params): Parameters<BugInfoParams>) -> Result<CallToolResult, McpError> {
    json_result(bug_info(params).await)
}
