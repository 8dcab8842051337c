//! Error types for Bugzilla REST operations.

use thiserror::Error;

/// Result type for Bugzilla client operations.
pub type Result<T> = std::result::Result<T, BugzillaError>;

/// Errors that can occur while talking to a Bugzilla server.
#[derive(Error, Debug)]
pub enum BugzillaError {
    /// The server answered with a status code other than the one the operation expects.
    #[error("Failed to fetch API with Status code: {0}")]
    Status(u16),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected envelope shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A direct id lookup returned an empty `bugs` array.
    #[error("Bugzilla returned no bug for id {0}")]
    EmptyResponse(u64),

    /// The comment envelope did not contain an entry for the requested bug.
    #[error("Bugzilla returned no comments entry for bug {0}")]
    MissingBug(u64),
}

impl BugzillaError {
    /// HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BugzillaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code() {
        let err = BugzillaError::Status(403);
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn non_status_errors_have_no_code() {
        assert_eq!(BugzillaError::EmptyResponse(7).status(), None);
        assert_eq!(BugzillaError::Decode("bad".into()).status(), None);
    }
}
