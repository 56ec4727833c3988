//! Tool dispatcher for `get_current_weather`
//!
//! The dispatcher is the MCP backend of this server. It owns the single tool
//! descriptor, turns a tool call into a provider lookup and renders the
//! forecast as the normalized JSON report.

use crate::provider::WeatherProvider;
use crate::report::WeatherReport;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, Dispatch};
use weather_mcp_protocol::{
    CallToolRequestParam, CallToolResult, Content, Error as McpError, Implementation,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool, Validator,
    MCP_VERSION,
};
use weather_mcp_server::McpBackend;

pub const TOOL_NAME: &str = "get_current_weather";
pub const SERVER_NAME: &str = "weather-mcp-server-stdio";

/// Descriptor advertised on `tools/list`
pub fn weather_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Get current weather and forecast for a location".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "location_name": {
                    "type": "string",
                    "description": "The location to get the weather for"
                }
            },
            "required": ["location_name"]
        }),
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid weather arguments: {0}")]
    InvalidArguments(String),

    /// Carries the provider's message unchanged
    #[error("Weather API error: {0}")]
    ProviderFailure(String),
}

impl From<DispatchError> for McpError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownTool(name) => McpError::tool_not_found(name),
            DispatchError::InvalidArguments(_) => McpError::invalid_params(err.to_string()),
            DispatchError::ProviderFailure(_) => McpError::internal_error(err.to_string()),
        }
    }
}

/// Validated arguments of a `get_current_weather` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherArguments {
    pub location_name: String,
}

impl WeatherArguments {
    pub fn parse(arguments: Option<&Value>, schema: &Value) -> Result<Self, DispatchError> {
        let invalid = |e: McpError| DispatchError::InvalidArguments(e.message);

        let args = Validator::validate_tool_arguments(arguments, schema).map_err(invalid)?;
        let location_name = args
            .get("location_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Validator::validate_non_empty(location_name, "location_name").map_err(invalid)?;

        Ok(Self {
            location_name: location_name.trim().to_string(),
        })
    }
}

/// MCP backend serving the weather tool
pub struct ToolDispatcher {
    provider: Arc<dyn WeatherProvider>,
    logger: Dispatch,
    timeout: Option<Duration>,
    tools: Vec<Tool>,
}

impl ToolDispatcher {
    /// Logs go to whatever subscriber is current at construction time
    pub fn new<P: WeatherProvider + 'static>(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
            logger: tracing::dispatcher::get_default(Dispatch::clone),
            timeout: None,
            tools: vec![weather_tool()],
        }
    }

    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Bound each provider lookup
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    fn log<T>(&self, emit: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.logger, emit)
    }

    /// Validate, look up and render one call
    pub async fn dispatch(&self, request: CallToolRequestParam) -> Result<CallToolResult, DispatchError> {
        let raw_arguments = request.arguments.as_ref().unwrap_or(&Value::Null);
        self.log(|| debug!("Tool call received: {} with arguments {}", request.name, raw_arguments));

        let Some(tool) = self.tools.iter().find(|tool| tool.name == request.name) else {
            self.log(|| error!("Unknown tool: {}", request.name));
            return Err(DispatchError::UnknownTool(request.name));
        };

        let arguments = match WeatherArguments::parse(request.arguments.as_ref(), &tool.input_schema) {
            Ok(arguments) => arguments,
            Err(e) => {
                self.log(|| error!("{}", e));
                return Err(e);
            }
        };

        match self.lookup(&arguments.location_name).await {
            Ok(text) => {
                self.log(|| debug!("Returning weather data for {}", arguments.location_name));
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(message) => {
                self.log(|| error!("Weather API error: {}", message));
                Err(DispatchError::ProviderFailure(message))
            }
        }
    }

    async fn lookup(&self, location: &str) -> Result<String, String> {
        let fetch = self.provider.get_forecast(location);
        let forecast = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(result) => result,
                Err(_) => Err(crate::WeatherError::Timeout(limit)),
            },
            None => fetch.await,
        }
        .map_err(|e| e.to_string())?;

        WeatherReport::from(&forecast)
            .to_json_pretty()
            .map_err(|e| format!("Failed to serialize weather report: {e}"))
    }
}

#[async_trait]
impl McpBackend for ToolDispatcher {
    type Error = DispatchError;

    fn get_server_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::new(SERVER_NAME, env!("CARGO_PKG_VERSION")),
            instructions: Some(format!(
                "Call {TOOL_NAME} with a location_name to get current conditions and a short forecast."
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
    ) -> std::result::Result<ListToolsResult, Self::Error> {
        self.log(|| debug!("Listing {} tools", self.tools.len()));
        Ok(ListToolsResult {
            tools: self.tools.clone(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> std::result::Result<CallToolResult, Self::Error> {
        self.dispatch(request).await
    }
}
