//! Weather tool for the Model Context Protocol
//!
//! Exposes a single tool, `get_current_weather`, that looks a location up on
//! wttr.in and answers with a small JSON report of the current conditions and
//! the daily outlook. The server runs over stdio.
//!
//! ```rust,no_run
//! use weather_mcp_service::{ToolDispatcher, WttrClient, WttrConfig};
//! use weather_mcp_server::{McpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = WttrClient::new(WttrConfig::default())?;
//! let dispatcher = ToolDispatcher::new(provider);
//! let mut server = McpServer::new(dispatcher, ServerConfig::default())?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod forecast;
pub mod provider;
pub mod report;
pub mod units;
pub mod wttr;

#[cfg(test)]
mod dispatcher_tests;

pub use config::{ConfigError, ServerArgs, WeatherServiceConfig};
pub use dispatcher::{DispatchError, ToolDispatcher, WeatherArguments, TOOL_NAME};
pub use error::WeatherError;
pub use forecast::{DailyForecast, Forecast, Kind, WindDirection};
pub use provider::WeatherProvider;
pub use report::WeatherReport;
pub use units::{Locale, Unit};
pub use wttr::{WttrClient, WttrConfig};
