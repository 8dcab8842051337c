//! In-process stand-in for a Bugzilla server, for tests.
//!
//! [`FakeBugzilla`] binds an axum server to an ephemeral localhost port, answers the routes
//! registered with [`FakeBugzillaBuilder::stub`] and records every request it sees. Unknown
//! routes answer 404.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub use axum::http::Method;

/// A request received by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Decoded query parameters.
    pub query: HashMap<String, String>,
    /// Request body parsed as JSON, when it was JSON.
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct Stub {
    method: Method,
    path: String,
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

struct Shared {
    stubs: Vec<Stub>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder collecting stubbed routes before the server starts.
#[derive(Default)]
pub struct FakeBugzillaBuilder {
    prefix: String,
    stubs: Vec<Stub>,
}

impl FakeBugzillaBuilder {
    /// Serve every route under `prefix` (e.g. `/bugzilla`), like an installation in a subdirectory.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        prefix.clone_into(&mut self.prefix);
        self
    }

    /// Answer `method path` with `status` and a JSON body.
    #[must_use]
    pub fn stub(mut self, method: Method, path: &str, status: u16, body: &Value) -> Self {
        self.stubs.push(Stub {
            method,
            path: format!("{}{path}", self.prefix),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            content_type: "application/json",
            body: body.to_string(),
        });
        self
    }

    /// Answer `GET path` with `status` and an HTML body.
    #[must_use]
    pub fn stub_html(mut self, path: &str, status: u16, body: &str) -> Self {
        self.stubs.push(Stub {
            method: Method::GET,
            path: format!("{}{path}", self.prefix),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            content_type: "text/html; charset=utf-8",
            body: body.to_owned(),
        });
        self
    }

    /// Bind to an ephemeral localhost port and start serving.
    ///
    /// # Errors
    /// Returns an error when the listener cannot be bound.
    pub async fn spawn(self) -> Result<FakeBugzilla> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind fake bugzilla listener")?;
        let addr = listener.local_addr().context("failed to read listener address")?;
        let shared = Arc::new(Shared {
            stubs: self.stubs,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(Arc::clone(&shared));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(FakeBugzilla {
            base_url: format!("http://{addr}{}", self.prefix),
            shared,
            shutdown: Some(shutdown_tx),
        })
    }
}

/// Running fake Bugzilla server. Stops when dropped.
pub struct FakeBugzilla {
    base_url: String,
    shared: Arc<Shared>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeBugzilla {
    /// Start building a fake server.
    #[must_use]
    pub fn builder() -> FakeBugzillaBuilder {
        FakeBugzillaBuilder::default()
    }

    /// Base URL of the server, including the configured prefix.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for FakeBugzilla {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn respond(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let path = uri.path().to_owned();
    shared
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query,
            body: serde_json::from_slice(&body).ok(),
        });

    shared
        .stubs
        .iter()
        .find(|stub| stub.method == method && stub.path == path)
        .map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            |stub| {
                (
                    stub.status,
                    [(header::CONTENT_TYPE, stub.content_type)],
                    stub.body.clone(),
                )
                    .into_response()
            },
        )
}
