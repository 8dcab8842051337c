//! Caller-facing error taxonomy for the MCP tools.

use bugzilla_mcp_client::BugzillaError;
use rmcp::ErrorData as McpError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to MCP callers.
///
/// Each variant belongs to one [`ErrorKind`], carried as `data.kind` in the MCP error so callers
/// can tell configuration problems from backend failures.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required credential header is missing from the request.
    #[error("`{0}` header is required")]
    MissingHeader(&'static str),

    /// A credential header is present but its value is not visible ASCII.
    #[error("`{0}` header has an unreadable value")]
    InvalidHeader(&'static str),

    /// A tool ran without a backend bound to the current request.
    #[error(
        "Bugzilla client not initialized. Please ensure api_key and bugzilla_url headers are provided."
    )]
    NotInitialized,

    /// A Bugzilla call failed.
    #[error("{context}\nReason: {source}")]
    Backend {
        /// Which operation failed.
        context: &'static str,
        /// Underlying client error.
        #[source]
        source: BugzillaError,
    },

    /// Bugzilla refused or failed to store a new comment.
    #[error("Failed to create a comment\n{0}")]
    CommentRejected(#[source] BugzillaError),

    /// The quicksearch endpoint answered with an unexpected status.
    #[error("Search failed with status code {0}")]
    SearchStatus(u16),

    /// Bugzilla returned a record without a field the tool relies on.
    #[error("Invalid record from Bugzilla: {0}")]
    InvalidRecord(String),

    /// The public quicksearch documentation page could not be fetched.
    #[error("Failed to fetch bugzilla quicksearch_syntax: {0}")]
    Documentation(#[source] BugzillaError),
}

/// Broad category of a [`ToolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller misconfiguration detected at the gate.
    Validation,
    /// Caller misconfiguration detected inside a tool.
    NotInitialized,
    /// Bugzilla misbehaved or was unreachable.
    Backend,
    /// Documentation page fetch failed.
    Documentation,
}

impl ErrorKind {
    /// Stable name used in the MCP error payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotInitialized => "not_initialized",
            Self::Backend => "backend",
            Self::Documentation => "documentation",
        }
    }
}

impl ToolError {
    /// Wrap a client error with the name of the failed operation.
    #[must_use]
    pub const fn backend(context: &'static str, source: BugzillaError) -> Self {
        Self::Backend { context, source }
    }

    /// Map a quicksearch failure, keeping the bare status code when there is one.
    #[must_use]
    pub fn search(source: BugzillaError) -> Self {
        match source.status() {
            Some(code) => Self::SearchStatus(code),
            None => Self::backend("Search failed", source),
        }
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingHeader(_) | Self::InvalidHeader(_) => ErrorKind::Validation,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Backend { .. }
            | Self::CommentRejected(_)
            | Self::SearchStatus(_)
            | Self::InvalidRecord(_) => ErrorKind::Backend,
            Self::Documentation(_) => ErrorKind::Documentation,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let data = Some(json!({ "kind": err.kind().as_str() }));
        match err.kind() {
            ErrorKind::Validation | ErrorKind::NotInitialized => Self::invalid_request(err.to_string(), data),
            ErrorKind::Backend | ErrorKind::Documentation => Self::internal_error(err.to_string(), data),
        }
    }
}
