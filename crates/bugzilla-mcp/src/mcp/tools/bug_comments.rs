//! Bug comments tool implementation.

use bugzilla_mcp_client::CommentRecord;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::Value;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::params::BugCommentsParams;
use crate::mcp::tools::common::json_result;

/// Fetch the comments of a bug, dropping private ones unless asked for.
///
/// # Errors
/// Fails when no backend is bound, the Bugzilla call fails, or a comment lacks a boolean
/// `is_private` flag while private comments are being filtered out.
pub async fn bug_comments(params: BugCommentsParams) -> Result<Vec<CommentRecord>, ToolError> {
    let bz = current_backend()?;
    let all_comments = bz
        .bug_comments(params.id)
        .await
        .map_err(|e| ToolError::backend("Failed to fetch bug comments", e))?;

    if params.include_private_comments {
        return Ok(all_comments);
    }

    let mut public_comments = Vec::with_capacity(all_comments.len());
    for comment in all_comments {
        match comment.get("is_private").and_then(Value::as_bool) {
            Some(false) => public_comments.push(comment),
            Some(true) => {}
            None => {
                return Err(ToolError::InvalidRecord(format!(
                    "comment on bug {} has no boolean is_private flag",
                    params.id
                )));
            }
        }
    }
    Ok(public_comments)
}

/// Return the comments of a bug. Private comments are excluded by default.
pub async fn handle_bug_comments(
    Parameters(params): Parameters<BugCommentsParams>,
) -> Result<CallToolResult, McpError> {
    json_result(bug_comments(params).await)
}
