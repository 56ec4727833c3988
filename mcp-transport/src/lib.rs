//! Stdio transport for the weather MCP server
//!
//! Messages are newline-delimited JSON-RPC 2.0 objects (or batches) read from
//! a byte stream and answered on another. The transport knows nothing about
//! tools; it decodes requests, hands them to a [`RequestHandler`], and writes
//! back whatever the handler answers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weather_mcp_transport::{create_transport, ResponseFuture, TransportConfig};
//! use weather_mcp_protocol::{Request, Response};
//!
//! # async fn run() -> Result<(), weather_mcp_transport::TransportError> {
//! let mut transport = create_transport(TransportConfig::default())?;
//! transport
//!     .start(Box::new(|request: Request| -> ResponseFuture {
//!         Box::pin(async move { Response::success(request.id, serde_json::json!({})) })
//!     }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod stdio;
pub mod validation;


use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error as ThisError;
use weather_mcp_protocol::{Request, Response};

pub use config::{StdioConfig, TransportConfig};
pub use stdio::StdioTransport;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Transport configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Future returned by a [`RequestHandler`]
pub type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Request handler function type
pub type RequestHandler = Box<dyn Fn(Request) -> ResponseFuture + Send + Sync>;

/// Transport layer trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// Serve messages until the input stream ends
    async fn start(&mut self, handler: RequestHandler) -> Result<(), TransportError>;
    async fn stop(&mut self) -> Result<(), TransportError>;
    async fn health_check(&self) -> Result<(), TransportError>;
}

/// Create a transport from configuration
pub fn create_transport(config: TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
    match config {
        TransportConfig::Stdio(stdio_config) => {
            stdio_config.validate()?;
            Ok(Box::new(StdioTransport::with_config(stdio_config)))
        }
    }
}
