//! Logging setup for stdio servers
//!
//! Stdout carries the protocol, so every log line goes to stderr.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Unknown log format: {0}")]
    UnknownFormat(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "compact")]
    Compact,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Include span context (request id, method) in each line
    pub with_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_spans: true,
        }
    }
}

impl LoggingConfig {
    /// Resolve the filter directive; `RUST_LOG` wins over the configured level
    pub fn filter_directive(&self) -> String {
        env::var("RUST_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.level.clone())
    }

    #[cfg(feature = "stdio-logging")]
    pub fn env_filter(&self) -> Result<tracing_subscriber::EnvFilter, LoggingError> {
        let directive = self.filter_directive();
        tracing_subscriber::EnvFilter::try_new(&directive)
            .map_err(|e| LoggingError::InvalidLevel(format!("{directive}: {e}")))
    }

    /// Install the global subscriber
    #[cfg(feature = "stdio-logging")]
    pub fn initialize(&self) -> Result<(), LoggingError> {
        use tracing_subscriber::{fmt, prelude::*};

        let filter = self.env_filter()?;
        let registry = tracing_subscriber::registry().with(filter);

        let result = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(self.with_spans)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };

        result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
    }
}
