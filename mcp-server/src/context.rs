//! Request context for MCP operations

use std::collections::HashMap;
use uuid::Uuid;
use weather_mcp_protocol::Implementation;

/// Per-request metadata carried through the handler
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID, independent of the JSON-RPC id the client chose
    pub request_id: Uuid,
    pub metadata: HashMap<String, String>,
    pub client_info: Option<Implementation>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            metadata: HashMap::new(),
            client_info: None,
        }
    }

    pub fn with_client_info(mut self, client_info: Implementation) -> Self {
        self.client_info = Some(client_info);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
