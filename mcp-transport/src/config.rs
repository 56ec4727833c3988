//! Transport configuration

use crate::TransportError;
use serde::{Deserialize, Serialize};

/// Default upper bound for a single message line
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Transport configuration
///
/// Only stdio is offered; MCP clients such as desktop assistants and the
/// inspector spawn the server as a child process and speak over its pipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransportConfig {
    /// Standard I/O transport
    Stdio(StdioConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Stdio(StdioConfig::default())
    }
}

impl TransportConfig {
    pub fn stdio() -> Self {
        Self::default()
    }
}

/// Configuration for stdio transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioConfig {
    /// Maximum message size in bytes (default: 10MB)
    pub max_message_size: usize,
    /// Enable message validation
    pub validate_messages: bool,
}

impl Default for StdioConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            validate_messages: true,
        }
    }
}

impl StdioConfig {
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.max_message_size == 0 {
            return Err(TransportError::Config(
                "max_message_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
