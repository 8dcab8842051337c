//! Per-request credential scoping.
//!
//! Every `tools/call` passes through [`CredentialGate::authorize`], which turns the caller's
//! `api_key` and `bugzilla_url` headers into a [`BugzillaClient`]. The client is then bound with
//! [`with_backend`] to a task-local scope wrapping only that request's dispatch, so tool handlers
//! reading [`current_backend`] observe their own caller's credentials and nobody else's.

use std::future::Future;
use std::sync::Arc;

use bugzilla_mcp_client::{BugzillaClient, ClientOptions};
use http::HeaderMap;
use tracing::{debug, warn};

use crate::error::ToolError;

/// Header carrying the caller's Bugzilla API key.
pub const API_KEY_HEADER: &str = "api_key";

/// Header carrying the caller's Bugzilla server address.
pub const BUGZILLA_URL_HEADER: &str = "bugzilla_url";

/// Hop-by-hop, proxy and session headers. A request carrying nothing but these has no caller
/// identity; any other header, `content-type` included, makes it a caller request.
const TRANSPORT_HEADERS: &[&str] = &[
    "host",
    "accept",
    "connection",
    "content-length",
    "expect",
    "keep-alive",
    "mcp-session-id",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "transfer-encoding",
    "upgrade",
];

tokio::task_local! {
    static BACKEND: Arc<BugzillaClient>;
}

/// Validates caller headers and builds the backend client for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialGate {
    options: ClientOptions,
}

impl CredentialGate {
    /// Create a gate whose clients use `options`.
    #[must_use]
    pub const fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    /// Build the backend client for a request with the given headers.
    ///
    /// `None`, or a header map without any caller headers, is an introspection context and gets
    /// the placeholder client.
    ///
    /// # Errors
    /// Returns [`ToolError::MissingHeader`] when caller headers are present but `api_key` or
    /// `bugzilla_url` is not, and [`ToolError::InvalidHeader`] when one of them cannot be read.
    pub fn authorize(&self, headers: Option<&HeaderMap>) -> Result<Arc<BugzillaClient>, ToolError> {
        let Some(headers) = headers.filter(|headers| has_caller_headers(headers)) else {
            debug!("no caller headers, binding placeholder client");
            return BugzillaClient::placeholder(self.options)
                .map(Arc::new)
                .map_err(|e| ToolError::backend("Failed to initialize Bugzilla client", e));
        };

        let api_key = required_header(headers, API_KEY_HEADER)?;
        let url = normalize_url(required_header(headers, BUGZILLA_URL_HEADER)?);

        debug!(bugzilla_url = %url, "binding bugzilla client");
        BugzillaClient::with_options(url, api_key, self.options)
            .map(Arc::new)
            .map_err(|e| ToolError::backend("Failed to initialize Bugzilla client", e))
    }
}

fn has_caller_headers(headers: &HeaderMap) -> bool {
    headers
        .keys()
        .any(|name| !TRANSPORT_HEADERS.contains(&name.as_str()))
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, ToolError> {
    let Some(value) = headers.get(name) else {
        warn!(header = name, "rejecting request without required header");
        return Err(ToolError::MissingHeader(name));
    };
    value.to_str().map_err(|_| {
        warn!(header = name, "rejecting request with unreadable header value");
        ToolError::InvalidHeader(name)
    })
}

/// Prefix `https://` unless the address already names `http://` or `https://`.
///
/// Nothing else is touched: paths and trailing slashes are kept as given.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    }
}

/// Run `future` with `client` bound as the backend of the current request.
///
/// The client is released once the future completes, unless a handler kept a clone.
pub async fn with_backend<F>(client: Arc<BugzillaClient>, future: F) -> F::Output
where
    F: Future,
{
    let output = BACKEND.scope(Arc::clone(&client), future).await;
    if let Ok(client) = Arc::try_unwrap(client) {
        client.release();
    }
    output
}

/// Backend bound to the current request.
///
/// # Errors
/// Returns [`ToolError::NotInitialized`] when called outside [`with_backend`].
pub fn current_backend() -> Result<Arc<BugzillaClient>, ToolError> {
    BACKEND
        .try_with(Arc::clone)
        .map_err(|_| ToolError::NotInitialized)
}
