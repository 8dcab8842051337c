//! Runtime configuration for the server process.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Result, bail};
use bugzilla_mcp_client::ClientOptions;
use clap::ValueEnum;

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Streamable HTTP; credentials come from request headers.
    Http,
    /// stdin/stdout; no headers, so the placeholder backend is bound.
    Stdio,
}

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Transport to serve on.
    pub transport: Transport,
    /// Listen address for the HTTP transport.
    pub bind: SocketAddr,
    /// Route the MCP endpoint is mounted at.
    pub path: String,
    /// Connect timeout for outbound Bugzilla requests.
    pub connect_timeout: Duration,
}

impl ServerConfig {
    /// Check values that clap cannot validate on its own.
    ///
    /// # Errors
    /// Returns an error when the MCP path does not start with `/` or is the root, or when the
    /// connect timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path == "/" {
            bail!("MCP path must start with '/' and name a route, got {:?}", self.path);
        }
        if self.connect_timeout.is_zero() {
            bail!("connect timeout must be greater than zero");
        }
        Ok(())
    }

    /// HTTP settings for Bugzilla clients.
    #[must_use]
    pub const fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_timeout: self.connect_timeout,
        }
    }
}
