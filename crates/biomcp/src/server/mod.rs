//! MCP server implementation.
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports over a
//! shared [`rpc::Dispatcher`]. Both transports close the response cache on
//! the way out so disk entries are swept and flushed.

pub mod rpc;
pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::tools::{self, McpTool, ToolContext};
use rpc::Dispatcher;

/// MCP server for the biomedical tools.
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Create a new MCP server with every tool registered.
    #[must_use]
    pub fn new(ctx: ToolContext) -> Self {
        let dispatcher = Dispatcher::new(tools::register_all_tools(), ctx);
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in stdio mode");
        tracing::info!("Registered {} tools", self.dispatcher.tools().len());

        let result = tokio::select! {
            result = stdio::run_stdio(&self.dispatcher) => result,
            () = shutdown_signal() => Ok(()),
        };

        self.shutdown().await;
        result
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server in HTTP mode on port {}", port);
        tracing::info!("Registered {} tools", self.dispatcher.tools().len());

        let router = transport::create_router(Arc::clone(&self.dispatcher));
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        tracing::info!("HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        self.shutdown().await;
        tracing::info!("HTTP server shut down");
        Ok(result?)
    }

    /// Get tool by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.dispatcher
            .tools()
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// List all available tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<(&str, &str)> {
        self.dispatcher
            .tools()
            .iter()
            .map(|t| (t.name(), t.description()))
            .collect()
    }

    /// Get tool context for execution.
    #[must_use]
    pub fn context(&self) -> &ToolContext {
        self.dispatcher.context()
    }

    /// Request dispatcher shared by the transports.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    async fn shutdown(&self) {
        self.context().client.close().await;
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("tools", &self.dispatcher.tools().len())
            .finish()
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    }
}
