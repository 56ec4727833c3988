//! Command line and environment configuration

use crate::units::{Locale, Unit};
use crate::wttr::WttrConfig;
use clap::Parser;
use std::time::Duration;
use thiserror::Error;
use weather_mcp_server::{LogFormat, LoggingConfig};
use weather_mcp_transport::config::{StdioConfig, DEFAULT_MAX_MESSAGE_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mcp_weather_service_stdio")]
#[command(about = "MCP server over stdio exposing a current-weather tool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct ServerArgs {
    /// Log filter directive, e.g. `debug` or `weather_mcp_service=trace`
    #[arg(long, env = "WEATHER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log line format: compact, pretty or json
    #[arg(long, env = "WEATHER_LOG_FORMAT", default_value = "compact")]
    pub log_format: String,

    /// Upper bound for one weather lookup in seconds, 0 disables it
    #[arg(long, env = "WEATHER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Attempts made when wttr.in answers with an error status
    #[arg(long, env = "WEATHER_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    /// Largest accepted request line in bytes
    #[arg(long, env = "WEATHER_MAX_MESSAGE_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    pub max_message_size: usize,
}

/// Validated process configuration
#[derive(Debug, Clone)]
pub struct WeatherServiceConfig {
    pub logging: LoggingConfig,
    pub wttr: WttrConfig,
    pub stdio: StdioConfig,
    pub tool_timeout: Option<Duration>,
}

impl ServerArgs {
    /// The tool always reads English text and imperial units
    pub fn into_config(self) -> Result<WeatherServiceConfig, ConfigError> {
        let format: LogFormat = self
            .log_format
            .parse()
            .map_err(|e| ConfigError::invalid("log_format", format!("{e}")))?;

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::invalid("log_level", "must not be empty"));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid("max_retries", "must be at least 1"));
        }

        let stdio = StdioConfig::default().with_max_message_size(self.max_message_size);
        stdio
            .validate()
            .map_err(|e| ConfigError::invalid("max_message_size", e.to_string()))?;

        let tool_timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));

        Ok(WeatherServiceConfig {
            logging: LoggingConfig {
                level: self.log_level,
                format,
                ..LoggingConfig::default()
            },
            wttr: WttrConfig {
                locale: Locale::ENGLISH,
                unit: Unit::Imperial,
                max_retries: self.max_retries,
                request_timeout: tool_timeout,
                ..WttrConfig::default()
            },
            stdio,
            tool_timeout,
        })
    }
}
