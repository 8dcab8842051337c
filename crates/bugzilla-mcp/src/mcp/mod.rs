//! MCP server implementation for bugzilla-mcp.

mod params;
mod tools;

pub use params::*;

use crate::gate::{self, CredentialGate};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeResult, ListToolsResult,
    ProtocolVersion, ServerCapabilities,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, tool, tool_router};
use tracing::{debug, warn};

const INSTRUCTIONS: &str = "Query and update Bugzilla bugs. Every request must carry the \
`api_key` and `bugzilla_url` headers of the Bugzilla account to act as.";

/// MCP server exposing Bugzilla tools.
///
/// Holds no credentials itself: each `tools/call` is bound to the backend derived from its own
/// request headers.
#[derive(Clone)]
pub struct BugzillaServer {
    tool_router: ToolRouter<Self>,
    gate: CredentialGate,
}

#[tool_router]
impl BugzillaServer {
    /// Create a new MCP server instance.
    pub fn new(gate: CredentialGate) -> Self {
        Self {
            tool_router: Self::tool_router(),
            gate,
        }
    }

    /// Fetch a bug with all of its fields.
    #[tool(description = "Returns the entire information about a given bugzilla bug id")]
    async fn bug_info(&self, params: Parameters<BugInfoParams>) -> Result<CallToolResult, McpError> {
        tools::bug_info::handle_bug_info(params).await
    }

    /// List the comments of a bug.
    #[tool(
        description = "Returns the comments of given bug id. Private comments are not included by default but can be explicitly requested"
    )]
    async fn bug_comments(
        &self,
        params: Parameters<BugCommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::bug_comments::handle_bug_comments(params).await
    }

    /// Add a comment to a bug.
    #[tool(
        description = "Add a comment to a bug. It can optionally be private. If success, returns the created comment id."
    )]
    async fn add_comment(&self, params: Parameters<AddCommentParams>) -> Result<CallToolResult, McpError> {
        tools::add_comment::handle_add_comment(params).await
    }

    /// Search bugs with quicksearch.
    #[tool(
        description = "Search bugs using bugzilla's quicksearch syntax. To reduce the token limit & response time, only returns a subset of fields for each bug. Full details of each bug are available through the bug_info tool"
    )]
    async fn bugs_quicksearch(
        &self,
        params: Parameters<BugsQuicksearchParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::bugs_quicksearch::handle_bugs_quicksearch(params).await
    }

    /// Fetch the quicksearch documentation page.
    #[tool(
        description = "Access the documentation of the bugzilla quicksearch syntax. Response is in HTML"
    )]
    async fn learn_quicksearch_syntax(&self) -> Result<CallToolResult, McpError> {
        tools::learn_quicksearch_syntax::handle_learn_quicksearch_syntax().await
    }

    /// Base URL of the bound server.
    #[tool(description = "bugzilla server's base url")]
    fn server_url(&self) -> Result<CallToolResult, McpError> {
        tools::server_url::handle_server_url()
    }

    /// Web link of a bug.
    #[tool(description = "returns the bug url")]
    fn bug_url(&self, params: Parameters<BugUrlParams>) -> Result<CallToolResult, McpError> {
        tools::bug_url::handle_bug_url(params)
    }
}

impl ServerHandler for BugzillaServer {
    fn get_info(&self) -> InitializeResult {
        let capabilities = ServerCapabilities::builder().enable_tools().build();

        InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities,
            server_info: Implementation {
                name: "bugzilla-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: Some("Bugzilla".into()),
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        // Headers of the HTTP request carrying this message; absent on stdio.
        let headers = context
            .extensions
            .get::<http::request::Parts>()
            .map(|parts| &parts.headers);
        let backend = self.gate.authorize(headers).map_err(|e| {
            warn!(tool = %request.name, error = %e, "rejected tool call");
            McpError::from(e)
        })?;
        debug!(tool = %request.name, bugzilla_url = %backend.base_url(), "dispatching tool call");

        let tool_context = ToolCallContext::new(self, request, context);
        gate::with_backend(backend, self.tool_router.call(tool_context)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_tool() {
        let server = BugzillaServer::new(CredentialGate::default());
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            [
                "add_comment",
                "bug_comments",
                "bug_info",
                "bug_url",
                "bugs_quicksearch",
                "learn_quicksearch_syntax",
                "server_url",
            ]
        );
    }

    #[test]
    fn tool_schemas_expose_parameter_names() {
        let server = BugzillaServer::new(CredentialGate::default());
        let tools = server.tool_router.list_all();
        let comments = tools
            .iter()
            .find(|tool| tool.name == "bug_comments")
            .map(|tool| serde_json::Value::Object((*tool.input_schema).clone()));
        let properties = comments
            .as_ref()
            .and_then(|schema| schema.get("properties"))
            .and_then(serde_json::Value::as_object);

        assert!(properties.is_some_and(|p| p.contains_key("id") && p.contains_key("include_private_comments")));
    }

    #[test]
    fn advertises_tools_capability() {
        let info = BugzillaServer::new(CredentialGate::default()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "bugzilla-mcp");
    }
}
