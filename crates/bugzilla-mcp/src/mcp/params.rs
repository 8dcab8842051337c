//! Parameter definitions for MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const fn default_limit() -> u32 {
    50
}

/// Parameters for fetching a single bug.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BugInfoParams {
    /// Bugzilla bug id.
    pub id: u64,
}

/// Parameters for listing the comments of a bug.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BugCommentsParams {
    /// Bugzilla bug id.
    pub id: u64,
    /// Also return comments marked private.
    #[serde(default)]
    pub include_private_comments: bool,
}

/// Parameters for adding a comment.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Bug to comment on.
    pub bug_id: u64,
    /// Comment text.
    pub comment: String,
    /// Restrict the comment to the private group.
    #[serde(default)]
    pub is_private: bool,
}

/// Parameters for a quicksearch query.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BugsQuicksearchParams {
    /// Query in Bugzilla quicksearch syntax.
    pub query: String,
    /// Maximum number of bugs to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Number of matching bugs to skip.
    #[serde(default)]
    pub offset: u32,
}

/// Parameters for building a bug's web link.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BugUrlParams {
    /// Bugzilla bug id.
    pub bug_id: u64,
}

/// Essential triage fields of a quicksearch hit.
///
/// Deserializes from a full Bugzilla bug (extra fields are ignored, missing ones are an error)
/// and serializes under the names returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuicksearchBug {
    #[serde(rename(serialize = "bug_id", deserialize = "id"))]
    pub bug_id: Value,
    pub product: Value,
    pub component: Value,
    pub assigned_to: Value,
    pub status: Value,
    pub resolution: Value,
    pub summary: Value,
    #[serde(rename(serialize = "last_updated", deserialize = "last_change_time"))]
    pub last_updated: Value,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn quicksearch_defaults_apply() {
        let params: BugsQuicksearchParams = serde_json::from_value(json!({"query": "crash"})).unwrap();
        assert_eq!(params.limit, 50);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn comment_flags_default_to_false() {
        let params: AddCommentParams =
            serde_json::from_value(json!({"bug_id": 1, "comment": "hi"})).unwrap();
        assert!(!params.is_private);

        let params: BugCommentsParams = serde_json::from_value(json!({"id": 1})).unwrap();
        assert!(!params.include_private_comments);
    }

    #[test]
    fn projection_renames_and_drops_fields() {
        let bug: QuicksearchBug = serde_json::from_value(json!({
            "id": 12345,
            "product": "Firefox",
            "component": "General",
            "assigned_to": "developer@example.com",
            "status": "NEW",
            "resolution": "",
            "summary": "Test bug",
            "last_change_time": "2023-01-20T15:45:00Z",
            "creation_time": "2023-01-15T10:30:00Z",
        }))
        .unwrap();

        let out = serde_json::to_value(&bug).unwrap();
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 8);
        assert_eq!(out["bug_id"], 12345);
        assert_eq!(out["last_updated"], "2023-01-20T15:45:00Z");
        assert!(out.get("creation_time").is_none());
    }

    #[test]
    fn projection_requires_every_field() {
        let result = serde_json::from_value::<QuicksearchBug>(json!({"id": 1, "product": "Firefox"}));
        assert!(result.is_err());
    }
}
