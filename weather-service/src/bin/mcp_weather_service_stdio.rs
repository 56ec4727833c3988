//! Weather MCP server over stdio

use anyhow::Context;
use clap::Parser;
use tracing::info;
use weather_mcp_server::{McpServer, ServerConfig, TransportConfig};
use weather_mcp_service::{ServerArgs, ToolDispatcher, WttrClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerArgs::parse()
        .into_config()
        .context("Invalid configuration")?;

    config
        .logging
        .initialize()
        .context("Failed to initialize logging")?;

    let provider = WttrClient::new(config.wttr.clone()).context("Failed to build wttr.in client")?;
    let mut dispatcher = ToolDispatcher::new(provider);
    if let Some(timeout) = config.tool_timeout {
        dispatcher = dispatcher.with_timeout(timeout);
    }

    let server_config = ServerConfig {
        server_info: weather_mcp_server::McpBackend::get_server_info(&dispatcher),
        transport_config: TransportConfig::Stdio(config.stdio.clone()),
        graceful_shutdown: true,
    };

    info!(
        "Starting {} {}",
        server_config.server_info.server_info.name, server_config.server_info.server_info.version
    );

    let mut server = McpServer::new(dispatcher, server_config).context("Failed to create server")?;
    server.run().await.context("Server error")?;

    info!("Weather server stopped");
    Ok(())
}
