//! The seam between the tool dispatcher and a weather data source

use crate::error::WeatherError;
use crate::forecast::Forecast;
use async_trait::async_trait;
use std::sync::Arc;

/// An asynchronous lookup from free-text location to current conditions
///
/// Implementations carry their own locale and unit configuration.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_forecast(&self, location: &str) -> Result<Forecast, WeatherError>;
}

#[async_trait]
impl<P: WeatherProvider + ?Sized> WeatherProvider for Arc<P> {
    async fn get_forecast(&self, location: &str) -> Result<Forecast, WeatherError> {
        (**self).get_forecast(location).await
    }
}
