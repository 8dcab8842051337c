//! CLI entry point for bugzilla-mcp.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use config::{ServerConfig, Transport};
use gate::CredentialGate;
use mcp::BugzillaServer;

mod config;
mod error;
mod gate;
mod mcp;
mod transport;

/// MCP server exposing Bugzilla to assistants, one caller identity per request.
#[derive(Parser, Debug)]
#[command(
    name = "bugzilla-mcp",
    version,
    about = "bugzilla-mcp: Bugzilla REST tools over the Model Context Protocol"
)]
struct Cli {
    /// Transport to serve MCP on.
    #[arg(long, value_enum, env = "BUGZILLA_MCP_TRANSPORT", default_value = "http")]
    transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "BUGZILLA_MCP_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Route the MCP endpoint is mounted at.
    #[arg(long, env = "BUGZILLA_MCP_PATH", default_value = "/mcp")]
    path: String,

    /// Connect timeout for Bugzilla requests, in seconds.
    #[arg(long, env = "BUGZILLA_MCP_CONNECT_TIMEOUT", default_value_t = 10)]
    connect_timeout: u64,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            transport: self.transport,
            bind: self.bind,
            path: self.path,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    let config = Cli::parse().into_config();
    config.validate()?;

    install_tracing();

    let server = BugzillaServer::new(CredentialGate::new(config.client_options()));
    info!(transport = ?config.transport, version = env!("CARGO_PKG_VERSION"), "starting bugzilla-mcp");

    tokio::runtime::Runtime::new()?.block_on(async move {
        match config.transport {
            Transport::Http => transport::serve_http(server, &config).await,
            Transport::Stdio => transport::serve_stdio(server).await,
        }
    })
}

fn install_tracing() {
    // stdout belongs to the stdio transport, so logs always go to stderr.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
