//! MyDisease MCP Server - Entry Point
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mydisease_mcp::{MyDiseaseClient, config::Config, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "mydisease-mcp")]
#[command(about = "MCP server for the MyDisease.info API")]
#[command(version)]
struct Cli {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", env = "MCP_TRANSPORT")]
    transport: Transport,

    /// HTTP bind address (only used with --transport http)
    #[arg(long, default_value = "0.0.0.0", env = "FASTMCP_SERVER_HOST")]
    host: String,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "FASTMCP_SERVER_PORT")]
    port: u16,

    /// Public base URL announced by the discovery document
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP on POST /mcp
    Http,
}

/// Logs go to stderr so stdio responses stay clean.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting MyDisease MCP server"
    );

    let config = Config::from_env()?;
    tracing::debug!(
        base_url = %config.base_url,
        concurrency = config.concurrency_limit,
        invocation_timeout = ?config.invocation_timeout,
        "Loaded configuration"
    );

    let client = MyDiseaseClient::new(&config)?;
    let server = McpServer::new(client, &config);

    match cli.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => {
            tracing::info!(host = %cli.host, port = cli.port, "Running in HTTP mode");
            server.run_http(&cli.host, cli.port, cli.public_url).await?;
        }
    }

    Ok(())
}
