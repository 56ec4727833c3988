//! Generic MCP server implementation

use crate::{backend::McpBackend, handler::GenericServerHandler};
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tracing::{error, info, warn};
use weather_mcp_protocol::*;
use weather_mcp_transport::{Transport, TransportConfig};

/// Error type for server operations
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Server already running")]
    AlreadyRunning,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server implementation information
    pub server_info: ServerInfo,

    /// Transport configuration
    pub transport_config: TransportConfig,

    /// Stop on Ctrl+C instead of waiting for the client to close stdin
    pub graceful_shutdown: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_info: ServerInfo {
                protocol_version: MCP_VERSION.to_string(),
                capabilities: ServerCapabilities::builder().enable_tools().build(),
                server_info: Implementation::new(
                    env!("CARGO_PKG_NAME"),
                    env!("CARGO_PKG_VERSION"),
                ),
                instructions: None,
            },
            transport_config: TransportConfig::default(),
            graceful_shutdown: true,
        }
    }
}

/// Generic MCP server with pluggable backend
pub struct McpServer<B: McpBackend> {
    backend: Arc<B>,
    handler: GenericServerHandler<B>,
    transport: Box<dyn Transport>,
    config: ServerConfig,
    running: bool,
}

impl<B: McpBackend + 'static> McpServer<B> {
    /// Create a new MCP server with the given backend and configuration
    pub fn new(backend: B, config: ServerConfig) -> std::result::Result<Self, ServerError> {
        info!("Initializing MCP server with backend");

        let transport = weather_mcp_transport::create_transport(config.transport_config.clone())
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        Ok(Self::with_transport(backend, transport, config))
    }

    /// Create a server over an already constructed transport
    pub fn with_transport(backend: B, transport: Box<dyn Transport>, config: ServerConfig) -> Self {
        let backend = Arc::new(backend);
        let handler = GenericServerHandler::new(backend.clone());

        Self {
            backend,
            handler,
            transport,
            config,
            running: false,
        }
    }

    /// Serve requests until the client closes the stream or Ctrl+C arrives
    pub async fn run(&mut self) -> std::result::Result<(), ServerError> {
        if self.running {
            return Err(ServerError::AlreadyRunning);
        }
        self.running = true;

        info!(
            "Starting MCP server {} {}",
            self.config.server_info.server_info.name, self.config.server_info.server_info.version
        );

        if let Err(e) = self.backend.on_startup().await {
            self.running = false;
            return Err(ServerError::Backend(e.to_string()));
        }

        let handler = self.handler.clone();
        let request_handler: weather_mcp_transport::RequestHandler =
            Box::new(move |request: Request| -> weather_mcp_transport::ResponseFuture {
                let handler = handler.clone();
                Box::pin(async move { handler.handle_request(request).await })
            });

        let served = if self.config.graceful_shutdown {
            tokio::select! {
                result = self.transport.start(request_handler) => result,
                signal = signal::ctrl_c() => {
                    match signal {
                        Ok(()) => warn!("Shutdown signal received"),
                        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                    }
                    Ok(())
                }
            }
        } else {
            self.transport.start(request_handler).await
        };

        let stopped = self.stop().await;
        served.map_err(|e| ServerError::Transport(e.to_string()))?;
        stopped
    }

    async fn stop(&mut self) -> std::result::Result<(), ServerError> {
        info!("Stopping MCP server");
        self.running = false;

        self.transport
            .stop()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;

        self.backend
            .on_shutdown()
            .await
            .map_err(|e| ServerError::Backend(e.to_string()))?;

        info!("MCP server stopped");
        Ok(())
    }

    /// Backend health as seen by the server
    pub async fn health_check(&self) -> std::result::Result<(), ServerError> {
        self.backend
            .health_check()
            .await
            .map_err(|e| ServerError::Backend(e.to_string()))
    }

    /// Get server information
    pub fn get_server_info(&self) -> &ServerInfo {
        &self.config.server_info
    }

    pub fn handler(&self) -> &GenericServerHandler<B> {
        &self.handler
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
