//! MCP tool implementations.

pub mod add_comment;
pub mod bug_comments;
pub mod bug_info;
pub mod bug_url;
pub mod bugs_quicksearch;
pub mod common;
pub mod learn_quicksearch_syntax;
pub mod server_url;
