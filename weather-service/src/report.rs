//! Normalized tool output
//!
//! The text block returned by `get_current_weather` is this structure
//! serialized with two-space indentation. Keys appear in declaration order.

use crate::forecast::{DailyForecast, Forecast};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub currently: Currently,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currently {
    pub temperature: i32,
    /// Emoji for the weather kind
    pub sky: String,
    pub feels_like: i32,
    pub humidity: u32,
    pub wind_speed: u32,
    /// Compass point followed by an arrow, e.g. `NNE↙`
    pub wind_direction: String,
    pub visibility: u32,
    pub uv_index: u32,
    pub description: String,
    pub location: String,
    pub forecasts: Vec<DayOutlook>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutlook {
    /// `YYYY-MM-DD`
    pub date: String,
    pub high_temperature: i32,
    pub low_temperature: i32,
}

impl From<&DailyForecast> for DayOutlook {
    fn from(day: &DailyForecast) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            high_temperature: day.highest_temperature,
            low_temperature: day.lowest_temperature,
        }
    }
}

impl From<&Forecast> for WeatherReport {
    fn from(forecast: &Forecast) -> Self {
        Self {
            currently: Currently {
                temperature: forecast.temperature,
                sky: forecast.kind.emoji().to_string(),
                feels_like: forecast.feels_like,
                humidity: forecast.humidity,
                wind_speed: forecast.wind_speed,
                wind_direction: forecast.wind_direction.to_string(),
                visibility: forecast.visibility,
                uv_index: forecast.ultraviolet.index,
                description: forecast.description.clone(),
                location: forecast.place(),
                forecasts: forecast.daily_forecasts.iter().map(DayOutlook::from).collect(),
            },
        }
    }
}

impl WeatherReport {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
