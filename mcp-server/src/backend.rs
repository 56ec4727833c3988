//! Backend trait for pluggable MCP implementations

use async_trait::async_trait;
use std::error::Error as StdError;
use thiserror::Error;
use weather_mcp_protocol::*;

/// Ready-made error type for backends that need nothing richer
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Internal backend error: {0}")]
    Internal(String),
}

impl BackendError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Internal(msg) => Error::internal_error(msg),
        }
    }
}

/// Main trait for MCP backend implementations
///
/// A backend supplies the tools and their behavior; the server takes care of
/// the JSON-RPC envelope, method routing and the transport.
#[async_trait]
pub trait McpBackend: Send + Sync {
    /// Backend-specific error type
    type Error: StdError + Send + Sync + Into<Error> + 'static;

    /// Get server information and capabilities
    fn get_server_info(&self) -> ServerInfo;

    /// Health check for the backend
    async fn health_check(&self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    /// List available tools with pagination
    async fn list_tools(
        &self,
        request: PaginatedRequestParam,
    ) -> std::result::Result<ListToolsResult, Self::Error>;

    /// Execute a tool with the given parameters
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> std::result::Result<CallToolResult, Self::Error>;

    /// Called when the server is starting up
    async fn on_startup(&self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Called when the server is shutting down
    async fn on_shutdown(&self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}
