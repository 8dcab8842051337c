//! Bug URL tool implementation.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::params::BugUrlParams;
use crate::mcp::tools::common::text_result;

/// Web link of a bug on the bound server.
///
/// # Errors
/// Fails when no backend is bound.
pub fn bug_url(params: &BugUrlParams) -> Result<String, ToolError> {
    Ok(current_backend()?.show_bug_url(params.bug_id))
}

/// Return the URL of a bug.
pub fn handle_bug_url(Parameters(params): Parameters<BugUrlParams>) -> Result<CallToolResult, McpError> {
    text_result(bug_url(&params))
}
