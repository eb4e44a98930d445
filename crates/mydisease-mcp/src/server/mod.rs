//! MCP server implementation.
//!
//! Provides both stdio (for desktop MCP clients) and streamable HTTP
//! transports over one shared set of tools.

pub mod stdio;
pub mod transport;

use std::sync::Arc;

use crate::client::MyDiseaseClient;
use crate::config::Config;
use crate::tools::{self, McpTool, ToolContext};

use transport::ServerState;

/// MCP server for MyDisease.info.
pub struct McpServer {
    state: Arc<ServerState>,
}

impl McpServer {
    /// Create a new MCP server.
    #[must_use]
    pub fn new(client: MyDiseaseClient, config: &Config) -> Self {
        let ctx = ToolContext::new(Arc::new(client), config);
        let tools = tools::register_all_tools();

        Self { state: Arc::new(ServerState { tools, ctx }) }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!(tools = self.state.tools.len(), "Starting MCP server in stdio mode");

        stdio::run_stdio(&self.state).await
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails.
    pub async fn run_http(self, host: &str, port: u16, public_url: Option<String>) -> anyhow::Result<()> {
        tracing::info!(tools = self.state.tools.len(), "Starting MCP server in HTTP mode");

        let router = transport::create_router(self.state, public_url);

        let listener = tokio::net::TcpListener::bind((host, port)).await?;
        tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Get tool by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.state.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// List all available tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<(&str, &str)> {
        self.state.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    /// Shared tools and context.
    #[must_use]
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.state.tools.len()).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
