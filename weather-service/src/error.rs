//! Errors raised while fetching or reading a forecast

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to decode weather data: {0}")]
    Decode(String),

    #[error("Malformed weather data: {0}")]
    Malformed(String),

    #[error("Weather lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid provider configuration: {0}")]
    Configuration(String),
}

impl WeatherError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Status errors are worth another attempt; everything else fails fast
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        Self::Request(err.to_string())
    }
}
