//! JSON-RPC envelopes and Model Context Protocol tool types
//!
//! This crate holds the wire-level vocabulary shared by the transport, the
//! server runtime and the weather tool: requests and responses, protocol
//! errors, tool descriptors and tool results.
//!
//! # Quick Start
//!
//! ```rust
//! use weather_mcp_protocol::{CallToolResult, Content, Tool};
//! use serde_json::json;
//!
//! let tool = Tool {
//!     name: "get_current_weather".to_string(),
//!     description: "Get current weather and forecast for a location".to_string(),
//!     input_schema: json!({
//!         "type": "object",
//!         "properties": {
//!             "location_name": {"type": "string"}
//!         },
//!         "required": ["location_name"]
//!     }),
//! };
//! assert_eq!(tool.required_arguments(), vec!["location_name"]);
//!
//! let result = CallToolResult::text("{\"currently\": {}}");
//! assert!(matches!(result.content[0], Content::Text { .. }));
//! ```

pub mod error;
pub mod model;
pub mod validation;


pub use error::{Error, ErrorCode, Result};
pub use model::*;
pub use validation::Validator;

/// Protocol version constants
pub const MCP_VERSION: &str = "2025-06-18";
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Check if a protocol version is supported
pub fn is_protocol_version_supported(version: &str) -> bool {
    SUPPORTED_PROTOCOL_VERSIONS.contains(&version)
}

/// Pick the protocol version to answer an `initialize` request with
///
/// The client's version is echoed back when we support it; otherwise the
/// latest version we speak is offered and the client decides.
pub fn negotiate_protocol_version(client_version: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == client_version)
        .copied()
        .unwrap_or(MCP_VERSION)
}
