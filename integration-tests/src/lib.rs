//! Integration tests for the weather MCP server
//!
//! These tests run the real server, transport and dispatcher together over an
//! in-memory pipe and talk to it the way an MCP client would: one JSON-RPC
//! object per line.

#![allow(clippy::uninlined_format_args)]

#[cfg(test)]
pub mod end_to_end_scenarios;
#[cfg(test)]
pub mod stdio_server_integration;

/// Common test utilities for integration tests
pub mod test_utils {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
    use weather_mcp_server::{McpBackend, McpServer, ServerConfig};
    use weather_mcp_service::{Forecast, WeatherError, WeatherProvider};
    use weather_mcp_transport::{StdioConfig, StdioTransport};

    /// Provider answering from a fixed table
    #[derive(Default)]
    pub struct FixedProvider {
        forecasts: HashMap<String, Forecast>,
        failure: Option<String>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        pub fn with(mut self, location: &str, temperature: i32, description: &str) -> Self {
            self.forecasts.insert(
                location.to_string(),
                Forecast {
                    temperature,
                    description: description.to_string(),
                    location: location.to_string(),
                    ..Forecast::default()
                },
            );
            self
        }

        pub fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn get_forecast(&self, location: &str) -> Result<Forecast, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.failure {
                return Err(WeatherError::Request(message.clone()));
            }
            self.forecasts
                .get(location)
                .cloned()
                .ok_or_else(|| WeatherError::malformed(format!("no data for {location}")))
        }
    }

    /// Shared handle so tests can inspect the provider after the server is gone
    pub fn shared(provider: FixedProvider) -> Arc<FixedProvider> {
        Arc::new(provider)
    }

    /// Run `backend` over an in-memory stdio pipe until `lines` are consumed
    ///
    /// Responses are returned in the order they were written, which is not
    /// necessarily the order of the requests.
    pub async fn run_session<B>(backend: B, lines: &[Value]) -> Vec<Value>
    where
        B: McpBackend + 'static,
    {
        let (client, server) = tokio::io::duplex(256 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let (mut client_read, mut client_write) = tokio::io::split(client);

        let transport =
            StdioTransport::from_io(BufReader::new(server_read), server_write, StdioConfig::default());
        let config = ServerConfig {
            graceful_shutdown: false,
            ..ServerConfig::default()
        };
        let mut server = McpServer::with_transport(backend, Box::new(transport), config);
        let served = tokio::spawn(async move { server.run().await });

        for line in lines {
            let mut text = serde_json::to_string(line).unwrap();
            text.push('\n');
            client_write.write_all(text.as_bytes()).await.unwrap();
        }
        client_write.shutdown().await.unwrap();

        served.await.unwrap().unwrap();

        let mut output = String::new();
        client_read.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Find the response carrying `id`
    pub fn response_for(responses: &[Value], id: Value) -> &Value {
        responses
            .iter()
            .find(|response| response["id"] == id)
            .unwrap_or_else(|| panic!("no response with id {id} in {responses:?}"))
    }

    pub fn initialize(id: i64) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "integration-client", "version": "0.0.1"}
            }
        })
    }

    pub fn initialized() -> Value {
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
    }

    pub fn call_weather(id: i64, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": "get_current_weather", "arguments": arguments}
        })
    }

    /// Decode the report carried by a successful `tools/call` response
    pub fn report_of(response: &Value) -> Value {
        let content = response["result"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap()
    }
}
