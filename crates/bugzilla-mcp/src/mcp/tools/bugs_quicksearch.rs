//! Quicksearch tool implementation.

use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use serde_json::Value;
use tracing::debug;

use crate::error::ToolError;
use crate::gate::current_backend;
use crate::mcp::params::{BugsQuicksearchParams, QuicksearchBug};
use crate::mcp::tools::common::json_result;

/// Run a quicksearch query and trim every hit to its essential fields.
///
/// # Errors
/// Fails when no backend is bound, Bugzilla does not answer 200, or a hit lacks one of the
/// projected fields.
pub async fn bugs_quicksearch(params: BugsQuicksearchParams) -> Result<Vec<QuicksearchBug>, ToolError> {
    let bz = current_backend()?;
    let all_bugs = bz
        .quicksearch(&params.query, params.limit, params.offset)
        .await
        .map_err(ToolError::search)?;
    debug!(query = %params.query, hits = all_bugs.len(), "quicksearch finished");

    all_bugs
        .into_iter()
        .map(|bug| {
            serde_json::from_value(Value::Object(bug))
                .map_err(|e| ToolError::InvalidRecord(format!("search result: {e}")))
        })
        .collect()
}

/// Search bugs using Bugzilla's quicksearch syntax.
pub async fn handle_bugs_quicksearch(
    Parameters(params): Parameters<BugsQuicksearchParams>,
) -> Result<CallToolResult, McpError> {
    json_result(bugs_quicksearch(params).await)
}
