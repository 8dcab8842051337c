//! Add comment tool implementation.

use bugzilla_mcp_client::CreatedComment;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use tracing::info;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::params::AddCommentParams;
use crate::mcp::tools::common::json_result;

/// Add a comment to a bug through the bound backend.
///
/// # Errors
/// Fails when no backend is bound or Bugzilla does not answer 201.
pub async fn add_comment(params: AddCommentParams) -> Result<CreatedComment, ToolError> {
    let AddCommentParams {
        bug_id,
        comment,
        is_private,
    } = params;

    let bz = current_backend()?;
    let created = bz
        .add_comment(bug_id, &comment, is_private)
        .await
        .map_err(ToolError::CommentRejected)?;
    info!(bug_id, comment_id = created.id, is_private, "comment added");
    Ok(created)
}

/// Add a comment to a bug and return the created comment id.
pub async fn handle_add_comment(
    Parameters(params): Parameters<AddCommentParams>,
) -> Result<CallToolResult, McpError> {
    json_result(add_comment(params).await)
}
