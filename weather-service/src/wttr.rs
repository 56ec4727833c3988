//! wttr.in client
//!
//! Forecasts come from the `?format=j1` JSON endpoint. Every number in that
//! document is a string, and most quantities appear once per unit system, so
//! the raw document is deserialized as-is and then read for one [`Unit`].

use crate::error::WeatherError;
use crate::forecast::{
    Astronomy, CompassPoint, DailyForecast, Forecast, Kind, UltraViolet, WindDirection,
};
use crate::provider::WeatherProvider;
use crate::units::{Locale, Unit};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use reqwest::{header, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

/// wttr.in rejects clients that do not look like a browser
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0";

const OBSERVATION_FORMAT: &str = "%Y-%m-%d %I:%M %p";
const CLOCK_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone)]
pub struct WttrConfig {
    pub locale: Locale,
    pub unit: Unit,
    /// Attempts made when wttr.in answers with an error status
    pub max_retries: u32,
    /// Delay before the second attempt; later attempts wait proportionally longer
    pub retry_backoff: Duration,
    pub request_timeout: Option<Duration>,
    /// Overrides `https://{locale}.wttr.in`
    pub base_url: Option<String>,
}

impl Default for WttrConfig {
    fn default() -> Self {
        Self {
            locale: Locale::ENGLISH,
            unit: Unit::Imperial,
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
            request_timeout: None,
            base_url: None,
        }
    }
}

#[derive(Debug)]
pub struct WttrClient {
    http: reqwest::Client,
    config: WttrConfig,
}

impl WttrClient {
    pub fn new(config: WttrConfig) -> Result<Self, WeatherError> {
        if config.max_retries == 0 {
            return Err(WeatherError::Configuration(
                "max_retries must be at least 1".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| WeatherError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WttrConfig {
        &self.config
    }

    /// URL of the j1 document for a location; the location is a single
    /// percent-encoded path segment
    pub fn forecast_url(&self, location: &str) -> Result<Url, WeatherError> {
        let base = match &self.config.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}.wttr.in/", self.config.locale),
        };

        let mut url = Url::parse(&base)
            .map_err(|e| WeatherError::Configuration(format!("invalid base URL '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|_| WeatherError::Configuration(format!("base URL '{base}' cannot have a path")))?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url)
    }

    async fn fetch(&self, url: &Url) -> Result<String, WeatherError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt + 1 < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    warn!("Attempt {} for {} failed ({}), retrying in {:?}", attempt, url, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Fetching {} failed: {}", url, e);
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, WeatherError> {
        let response = self
            .http
            .get(url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await?;
            if !body.is_empty() {
                warn!("Got 404 but received content for URL: {}", url);
                return Ok(body);
            }
            return Err(WeatherError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl WeatherProvider for WttrClient {
    async fn get_forecast(&self, location: &str) -> Result<Forecast, WeatherError> {
        let url = self.forecast_url(location)?;
        debug!("Fetching forecast from {}", url);

        let body = self.fetch(&url).await?;
        parse_forecast(&body, self.config.unit, self.config.locale)
    }
}

/// Read a j1 document into a [`Forecast`]
pub fn parse_forecast(body: &str, unit: Unit, locale: Locale) -> Result<Forecast, WeatherError> {
    let value: Value = serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    let raw: RawResponse =
        serde_json::from_value(value).map_err(|e| WeatherError::Malformed(e.to_string()))?;
    raw.into_forecast(unit, locale)
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    current_condition: Vec<RawCurrentCondition>,
    nearest_area: Vec<RawArea>,
    weather: Vec<RawDay>,
    #[serde(default)]
    request: Vec<RawRequest>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentCondition {
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    #[serde(rename = "FeelsLikeF")]
    feels_like_f: String,
    humidity: String,
    local_obs_date_time: String,
    #[serde(rename = "precipInches")]
    precip_inches: String,
    #[serde(rename = "precipMM")]
    precip_mm: String,
    pressure: String,
    pressure_inches: String,
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "temp_F")]
    temp_f: String,
    uv_index: String,
    visibility: String,
    visibility_miles: String,
    weather_code: String,
    weather_desc: Vec<RawText>,
    #[serde(rename = "winddir16Point")]
    winddir_16_point: String,
    winddir_degree: String,
    windspeed_kmph: String,
    windspeed_miles: String,
    /// Localized descriptions arrive as `lang_<code>`
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArea {
    area_name: Vec<RawText>,
    country: Vec<RawText>,
    region: Vec<RawText>,
    latitude: String,
    longitude: String,
    population: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDay {
    astronomy: Vec<RawAstronomy>,
    #[serde(rename = "avgtempC")]
    avgtemp_c: String,
    #[serde(rename = "avgtempF")]
    avgtemp_f: String,
    date: String,
    #[serde(rename = "maxtempC")]
    maxtemp_c: String,
    #[serde(rename = "maxtempF")]
    maxtemp_f: String,
    #[serde(rename = "mintempC")]
    mintemp_c: String,
    #[serde(rename = "mintempF")]
    mintemp_f: String,
    sun_hour: String,
    #[serde(rename = "totalSnow_cm")]
    total_snow_cm: String,
}

#[derive(Debug, Deserialize)]
struct RawAstronomy {
    moon_illumination: String,
    moon_phase: String,
    moonrise: String,
    moonset: String,
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    query: String,
    #[serde(rename = "type")]
    kind: String,
}

fn number<T>(field: &str, raw: &str) -> Result<T, WeatherError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| WeatherError::malformed(format!("{field}: '{raw}' ({e})")))
}

fn first_text<'a>(field: &str, texts: &'a [RawText]) -> Result<&'a str, WeatherError> {
    texts
        .first()
        .map(|t| t.value.trim())
        .ok_or_else(|| WeatherError::malformed(format!("{field} is empty")))
}

/// Clock times such as `06:12 AM`; wttr.in writes `No moonrise` and the like
/// when there is none
fn clock_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), CLOCK_FORMAT).ok()
}

/// `Lat 48.85 and Lon 2.35`
static LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Lat (-?\d+(?:\.\d+)?) and Lon (-?\d+(?:\.\d+)?)$").expect("valid regex")
});

/// Coordinates from a `LatLon` request query, e.g. `Lat 48.86 and Lon 2.34`
pub(crate) fn parse_lat_lon(query: &str) -> Option<(f64, f64)> {
    let captures = LAT_LON.captures(query.trim())?;
    Some((captures[1].parse().ok()?, captures[2].parse().ok()?))
}

impl RawResponse {
    fn into_forecast(self, unit: Unit, locale: Locale) -> Result<Forecast, WeatherError> {
        let current = self
            .current_condition
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::malformed("current_condition is empty"))?;
        let area = self
            .nearest_area
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::malformed("nearest_area is empty"))?;

        let coordinates = match self
            .request
            .iter()
            .find(|r| r.kind == "LatLon")
            .and_then(|r| parse_lat_lon(&r.query))
        {
            Some(coordinates) => coordinates,
            None => (
                number("latitude", &area.latitude)?,
                number("longitude", &area.longitude)?,
            ),
        };

        let daily_forecasts = self
            .weather
            .into_iter()
            .map(|day| day.into_daily(unit))
            .collect::<Result<Vec<_>, _>>()?;

        let observed_at =
            NaiveDateTime::parse_from_str(current.local_obs_date_time.trim(), OBSERVATION_FORMAT)
                .map_err(|e| {
                    WeatherError::malformed(format!(
                        "localObsDateTime: '{}' ({e})",
                        current.local_obs_date_time
                    ))
                })?;

        let description = current.description(locale)?;
        let (temperature, feels_like) = match unit {
            Unit::Imperial => (&current.temp_f, &current.feels_like_f),
            Unit::Metric => (&current.temp_c, &current.feels_like_c),
        };
        let (wind_speed, visibility, precipitation, pressure) = match unit {
            Unit::Imperial => (
                &current.windspeed_miles,
                &current.visibility_miles,
                &current.precip_inches,
                &current.pressure_inches,
            ),
            Unit::Metric => (
                &current.windspeed_kmph,
                &current.visibility,
                &current.precip_mm,
                &current.pressure,
            ),
        };

        Ok(Forecast {
            temperature: number(&format!("temp_{}", unit.temperature()), temperature)?,
            feels_like: number(&format!("FeelsLike{}", unit.temperature()), feels_like)?,
            humidity: number("humidity", &current.humidity)?,
            wind_speed: number(&format!("windspeed{}", unit.velocity()), wind_speed)?,
            wind_direction: WindDirection::new(
                current.winddir_16_point.parse::<CompassPoint>()?,
                number("winddirDegree", &current.winddir_degree)?,
            ),
            visibility: number(&format!("visibility{}", unit.visibility()), visibility)?,
            precipitation: number(&format!("precip{}", unit.precipitation()), precipitation)?,
            pressure: number(&format!("pressure{}", unit.pressure()), pressure)?,
            ultraviolet: UltraViolet::new(number("uvIndex", &current.uv_index)?),
            kind: Kind::from_code(number("weatherCode", &current.weather_code)?),
            description,
            location: first_text("areaName", &area.area_name)?.to_string(),
            region: first_text("region", &area.region)?.to_string(),
            country: first_text("country", &area.country)?.to_string(),
            coordinates,
            local_population: number("population", &area.population)?,
            observed_at,
            daily_forecasts,
        })
    }
}

impl RawCurrentCondition {
    fn description(&self, locale: Locale) -> Result<String, WeatherError> {
        if locale.is_english() {
            return Ok(first_text("weatherDesc", &self.weather_desc)?.to_string());
        }

        let key = format!("lang_{}", locale.code());
        self.extra
            .get(&key)
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("value"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| WeatherError::malformed(format!("{key} is missing")))
    }
}

impl RawDay {
    fn into_daily(self, unit: Unit) -> Result<DailyForecast, WeatherError> {
        let astronomy = self
            .astronomy
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::malformed("astronomy is empty"))?;

        let (max, min, avg) = match unit {
            Unit::Imperial => (&self.maxtemp_f, &self.mintemp_f, &self.avgtemp_f),
            Unit::Metric => (&self.maxtemp_c, &self.mintemp_c, &self.avgtemp_c),
        };

        let snow_cm: f64 = number("totalSnow_cm", &self.total_snow_cm)?;

        Ok(DailyForecast {
            date: NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
                .map_err(|e| WeatherError::malformed(format!("date: '{}' ({e})", self.date)))?,
            highest_temperature: number(&format!("maxtemp{}", unit.temperature()), max)?,
            lowest_temperature: number(&format!("mintemp{}", unit.temperature()), min)?,
            average_temperature: number(&format!("avgtemp{}", unit.temperature()), avg)?,
            sunlight: number("sunHour", &self.sun_hour)?,
            snowfall: snow_cm / unit.snow_divisor(),
            astronomy: Astronomy {
                sunrise: clock_time(&astronomy.sunrise),
                sunset: clock_time(&astronomy.sunset),
                moonrise: clock_time(&astronomy.moonrise),
                moonset: clock_time(&astronomy.moonset),
                moon_phase: astronomy.moon_phase.parse()?,
                moon_illumination: number("moon_illumination", &astronomy.moon_illumination)?,
            },
        })
    }
}
