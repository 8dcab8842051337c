//! Transports the MCP server can be served on.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum::routing::get;
use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::mcp::BugzillaServer;

/// Router with the MCP endpoint mounted at `path` and a `/health` probe.
pub fn router(server: BugzillaServer, path: &str) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route(
            "/health",
            get(|| async {
                axum::Json(json!({
                    "status": "ok",
                    "version": env!("CARGO_PKG_VERSION"),
                }))
            }),
        )
        .nest_service(path, service)
}

/// Serve over streamable HTTP until Ctrl-C.
///
/// # Errors
/// Returns an error when the listener cannot be bound or the server fails.
pub async fn serve_http(server: BugzillaServer, config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, path = %config.path, "serving MCP over HTTP");

    axum::serve(listener, router(server, &config.path))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("HTTP server failed")
}

/// Serve over stdin/stdout until the peer disconnects.
///
/// # Errors
/// Returns an error when the MCP session cannot be established or ends abnormally.
pub async fn serve_stdio(server: BugzillaServer) -> Result<()> {
    info!("serving MCP over stdio");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let running = server
        .serve(transport)
        .await
        .map_err(|e| anyhow!("{e:?}"))?;
    running.waiting().await.map_err(|e| anyhow!("{e:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gate::CredentialGate;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt as _;

    fn app() -> Router {
        router(BugzillaServer::new(CredentialGate::default()), "/mcp")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn mcp_endpoint_is_mounted() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_ne!(response.status(), StatusCode::NOT_FOUND);
    }

    const SSE_ACCEPT: &str = "application/json, text/event-stream";

    /// Client side of one streamable HTTP session against a live listener.
    struct Session {
        http: reqwest::Client,
        url: String,
        id: Option<String>,
    }

    impl Session {
        async fn connect() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let _ = axum::serve(listener, app()).await;
            });

            let mut session = Self {
                http: reqwest::Client::new(),
                url: format!("http://{addr}/mcp"),
                id: None,
            };
            let response = session
                .post(
                    &json!({
                        "jsonrpc": "2.0",
                        "id": 0,
                        "method": "initialize",
                        "params": {
                            "protocolVersion": "2025-03-26",
                            "capabilities": {},
                            "clientInfo": {"name": "transport-test", "version": "0.0.0"}
                        }
                    }),
                    &[],
                )
                .await;
            session.id = response
                .headers()
                .get("mcp-session-id")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let init = read_message(response, 0).await;
            assert!(init.get("result").is_some(), "initialize failed: {init}");

            let response = session
                .post(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}), &[])
                .await;
            assert!(response.status().is_success(), "initialized rejected: {}", response.status());
            session
        }

        async fn post(&self, body: &Value, headers: &[(&str, &str)]) -> reqwest::Response {
            let mut request = self
                .http
                .post(&self.url)
                .header("accept", SSE_ACCEPT)
                .json(body);
            if let Some(id) = &self.id {
                request = request.header("mcp-session-id", id);
            }
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            request.send().await.unwrap()
        }

        async fn call_tool(&self, id: u64, name: &str, headers: &[(&str, &str)]) -> Value {
            let body = json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": {"name": name, "arguments": {}}
            });
            read_message(self.post(&body, headers).await, id).await
        }
    }

    /// First JSON-RPC message answering `id`, from either an SSE stream or a plain JSON body.
    async fn read_message(mut response: reqwest::Response, id: u64) -> Value {
        let read = async {
            let mut buffer = String::new();
            while let Some(chunk) = response.chunk().await.unwrap() {
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                let found = buffer
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .filter_map(|data| serde_json::from_str::<Value>(data.trim()).ok())
                    .find(|message| message["id"] == id);
                if let Some(message) = found {
                    return message;
                }
            }
            serde_json::from_str(&buffer).unwrap()
        };
        tokio::time::timeout(Duration::from_secs(10), read).await.unwrap()
    }

    #[tokio::test]
    async fn tool_calls_are_bound_to_their_own_request_headers() {
        let session = Session::connect().await;

        let bound = session
            .call_tool(1, "server_url", &[("api_key", "key-one"), ("bugzilla_url", "bz.one/path")])
            .await;
        assert_eq!(bound["result"]["content"][0]["text"], "https://bz.one/path", "got {bound}");

        let anonymous = session.call_tool(2, "server_url", &[]).await;
        assert_eq!(anonymous["error"]["message"], "`api_key` header is required", "got {anonymous}");
        assert_eq!(anonymous["error"]["data"]["kind"], "validation");

        let partial = session.call_tool(3, "server_url", &[("api_key", "key-one")]).await;
        assert_eq!(partial["error"]["message"], "`bugzilla_url` header is required", "got {partial}");
        assert_eq!(partial["error"]["data"]["kind"], "validation");
    }
}
