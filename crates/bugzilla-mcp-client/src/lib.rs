//! Minimal Bugzilla REST client used by the bugzilla-mcp server.
//!
//! A [`BugzillaClient`] is bound to exactly one `(server, api key)` pair and owns its own
//! connection pool. Every operation is a single HTTP round trip: the status code is checked
//! against the one the operation expects and the response envelope is unwrapped. There is no
//! retry.

mod error;

pub use error::{BugzillaError, Result};

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Bug fields as returned by Bugzilla. The schema is not modelled here.
pub type BugRecord = Map<String, Value>;

/// Comment fields as returned by Bugzilla. Includes at least `is_private`.
pub type CommentRecord = Map<String, Value>;

/// Base URL of the placeholder client used when a request carries no credentials.
pub const PLACEHOLDER_URL: &str = "https://bugzilla.example.com";

/// API key of the placeholder client.
pub const PLACEHOLDER_API_KEY: &str = "inspection-placeholder";

const QUICKSEARCH_HELP_PAGE: &str = "page.cgi?id=quicksearch.html";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifier of a freshly created comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedComment {
    /// Comment id assigned by Bugzilla.
    pub id: u64,
}

/// HTTP settings shared by every client the server creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Maximum time spent establishing a connection.
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    fn build_http(self) -> Result<Client> {
        Client::builder()
            .user_agent(concat!("bugzilla-mcp/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(BugzillaError::from)
    }
}

#[derive(Deserialize)]
struct BugList {
    bugs: Vec<BugRecord>,
}

#[derive(Deserialize)]
struct CommentEnvelope {
    bugs: HashMap<String, BugComments>,
}

#[derive(Deserialize)]
struct BugComments {
    comments: Vec<CommentRecord>,
}

#[derive(Serialize)]
struct NewComment<'a> {
    comment: &'a str,
    is_private: bool,
}

/// Client bound to one Bugzilla server and API key.
#[derive(Debug, Clone)]
pub struct BugzillaClient {
    base_url: String,
    api_url: String,
    api_key: String,
    params: Vec<(&'static str, String)>,
    options: ClientOptions,
    http: Client,
}

impl BugzillaClient {
    /// Create a client for `url` authenticating with `api_key`, using default HTTP settings.
    ///
    /// `url` is used verbatim as the base; the REST root is `url + "/rest"`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(url, api_key, ClientOptions::default())
    }

    /// Create a client with explicit HTTP settings.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_options(
        url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self> {
        let base_url = url.into();
        let api_key = api_key.into();
        Ok(Self {
            api_url: format!("{base_url}/rest"),
            params: vec![("api_key", api_key.clone())],
            base_url,
            api_key,
            options,
            http: options.build_http()?,
        })
    }

    /// Client with sentinel credentials for contexts that carry no caller identity.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn placeholder(options: ClientOptions) -> Result<Self> {
        Self::with_options(PLACEHOLDER_URL, PLACEHOLDER_API_KEY, options)
    }

    /// Server base URL, used for non-REST pages.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST API root (`base_url + "/rest"`).
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// API key sent with every REST call.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Query parameters sent with every REST call.
    #[must_use]
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// HTTP settings this client was built with.
    #[must_use]
    pub const fn options(&self) -> ClientOptions {
        self.options
    }

    /// Web link to a bug on this server.
    #[must_use]
    pub fn show_bug_url(&self, bug_id: u64) -> String {
        format!("{}/show_bug.cgi?id={bug_id}", self.base_url)
    }

    /// Fetch every field of a single bug.
    ///
    /// # Errors
    /// Returns [`BugzillaError::Status`] unless the server answers 200, and
    /// [`BugzillaError::EmptyResponse`] if the `bugs` array is empty.
    pub async fn bug_info(&self, bug_id: u64) -> Result<BugRecord> {
        let response = self
            .http
            .get(format!("{}/bug/{bug_id}", self.api_url))
            .query(&self.params)
            .send()
            .await?;
        let list: BugList = decode(expect_status(response, StatusCode::OK)?).await?;
        list.bugs
            .into_iter()
            .next()
            .ok_or(BugzillaError::EmptyResponse(bug_id))
    }

    /// Fetch all comments of a bug, private ones included.
    ///
    /// # Errors
    /// Returns [`BugzillaError::Status`] unless the server answers 200, and
    /// [`BugzillaError::MissingBug`] if the envelope has no entry keyed by the bug id.
    pub async fn bug_comments(&self, bug_id: u64) -> Result<Vec<CommentRecord>> {
        let response = self
            .http
            .get(format!("{}/bug/{bug_id}/comment", self.api_url))
            .query(&self.params)
            .send()
            .await?;
        let mut envelope: CommentEnvelope = decode(expect_status(response, StatusCode::OK)?).await?;
        // Bugzilla keys this map by the bug id rendered as a string.
        envelope
            .bugs
            .remove(&bug_id.to_string())
            .map(|entry| entry.comments)
            .ok_or(BugzillaError::MissingBug(bug_id))
    }

    /// Add a comment to a bug.
    ///
    /// # Errors
    /// Returns [`BugzillaError::Status`] unless the server answers 201.
    pub async fn add_comment(&self, bug_id: u64, comment: &str, is_private: bool) -> Result<CreatedComment> {
        let response = self
            .http
            .post(format!("{}/bug/{bug_id}/comment", self.api_url))
            .query(&self.params)
            .json(&NewComment { comment, is_private })
            .send()
            .await?;
        decode(expect_status(response, StatusCode::CREATED)?).await
    }

    /// Run a quicksearch query and return the raw matching bugs.
    ///
    /// # Errors
    /// Returns [`BugzillaError::Status`] unless the server answers 200.
    pub async fn quicksearch(&self, query: &str, limit: u32, offset: u32) -> Result<Vec<BugRecord>> {
        let mut params = self.params.clone();
        params.push(("quicksearch", query.to_owned()));
        params.push(("limit", limit.to_string()));
        params.push(("offset", offset.to_string()));

        let response = self
            .http
            .get(format!("{}/bug", self.api_url))
            .query(&params)
            .send()
            .await?;
        let list: BugList = decode(expect_status(response, StatusCode::OK)?).await?;
        Ok(list.bugs)
    }

    /// Release the connection pool held by this client.
    pub fn release(self) {
        debug!(base_url = %self.base_url, "releasing bugzilla client");
        drop(self.http);
    }
}

/// Fetch the public quicksearch documentation page of a Bugzilla server.
///
/// Uses a fresh connection without API credentials.
///
/// # Errors
/// Returns [`BugzillaError::Status`] unless the server answers 200.
pub async fn fetch_quicksearch_syntax(base_url: &str, options: ClientOptions) -> Result<String> {
    let http = options.build_http()?;
    let response = http
        .get(format!("{base_url}/{QUICKSEARCH_HELP_PAGE}"))
        .send()
        .await?;
    let response = expect_status(response, StatusCode::OK)?;
    Ok(response.text().await?)
}

fn expect_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    debug!(url = %response.url().path(), status = status.as_u16(), "bugzilla response");
    if status == expected {
        Ok(response)
    } else {
        Err(BugzillaError::Status(status.as_u16()))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn derives_rest_root_from_base() {
        let client = BugzillaClient::new("https://bugzilla.example.com/bugzilla", "key").unwrap();
        assert_eq!(client.base_url(), "https://bugzilla.example.com/bugzilla");
        assert_eq!(client.api_url(), "https://bugzilla.example.com/bugzilla/rest");
        assert_eq!(client.params(), &[("api_key", "key".to_owned())]);
    }

    #[test]
    fn placeholder_uses_sentinel_credentials() {
        let client = BugzillaClient::placeholder(ClientOptions::default()).unwrap();
        assert_eq!(client.base_url(), PLACEHOLDER_URL);
        assert_eq!(client.api_key(), PLACEHOLDER_API_KEY);
    }

    #[test]
    fn builds_show_bug_links() {
        let client = BugzillaClient::new("http://bz.local", "key").unwrap();
        assert_eq!(client.show_bug_url(42), "http://bz.local/show_bug.cgi?id=42");
    }

    #[test]
    fn new_comment_serializes_exact_body() {
        let body = serde_json::to_value(NewComment {
            comment: "text",
            is_private: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"comment": "text", "is_private": true}));
    }
}
