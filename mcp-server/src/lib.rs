//! Generic MCP server runtime with a pluggable backend
//!
//! The server owns a transport and a backend. It answers the protocol
//! handshake and routes tool listing and tool calls to the backend, which
//! only has to describe its tools and execute them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weather_mcp_server::{BackendError, McpBackend, McpServer, ServerConfig};
//! use weather_mcp_server::{
//!     CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam, ServerInfo,
//! };
//! use async_trait::async_trait;
//!
//! struct EchoBackend;
//!
//! #[async_trait]
//! impl McpBackend for EchoBackend {
//!     type Error = BackendError;
//!
//!     fn get_server_info(&self) -> ServerInfo {
//!         ServerConfig::default().server_info
//!     }
//!
//!     async fn list_tools(&self, _: PaginatedRequestParam) -> Result<ListToolsResult, Self::Error> {
//!         Ok(ListToolsResult { tools: vec![], next_cursor: None })
//!     }
//!
//!     async fn call_tool(&self, request: CallToolRequestParam) -> Result<CallToolResult, Self::Error> {
//!         Ok(CallToolResult::text(request.name))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = McpServer::new(EchoBackend, ServerConfig::default())?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod context;
pub mod handler;
pub mod logging;
pub mod server;


// Re-export core types
pub use backend::{BackendError, McpBackend};
pub use context::RequestContext;
pub use handler::GenericServerHandler;
pub use logging::{LogFormat, LoggingConfig, LoggingError};
pub use server::{McpServer, ServerConfig, ServerError};

// Re-export from dependencies for convenience
pub use weather_mcp_protocol::{self as protocol, *};
pub use weather_mcp_transport::{self as transport, Transport, TransportConfig};
