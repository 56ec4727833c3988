//! Forecast model returned by weather providers

use crate::error::WeatherError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current conditions at a location plus the upcoming daily forecasts
///
/// Quantities are in the unit system the provider was configured with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    pub temperature: i32,
    pub feels_like: i32,
    /// Relative humidity in percent
    pub humidity: u32,
    pub wind_speed: u32,
    pub wind_direction: WindDirection,
    pub visibility: u32,
    pub precipitation: f64,
    pub pressure: f64,
    pub ultraviolet: UltraViolet,
    pub kind: Kind,
    pub description: String,
    pub location: String,
    pub region: String,
    pub country: String,
    pub coordinates: (f64, f64),
    pub local_population: u64,
    /// Local time of the observation
    pub observed_at: NaiveDateTime,
    pub daily_forecasts: Vec<DailyForecast>,
}

impl Forecast {
    /// "Area, Region, Country", skipping blank parts
    pub fn place(&self) -> String {
        [&self.location, &self.region, &self.country]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub highest_temperature: i32,
    pub lowest_temperature: i32,
    pub average_temperature: i32,
    /// Hours of sunlight
    pub sunlight: f64,
    pub snowfall: f64,
    pub astronomy: Astronomy,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Astronomy {
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub moonrise: Option<NaiveTime>,
    pub moonset: Option<NaiveTime>,
    pub moon_phase: MoonPhase,
    /// Illuminated share of the moon in percent
    pub moon_illumination: u32,
}

/// Weather kind derived from the WWO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Kind {
    #[default]
    Sunny,
    PartlyCloudy,
    Cloudy,
    VeryCloudy,
    Fog,
    LightShowers,
    LightSleetShowers,
    LightSleet,
    ThunderyShowers,
    LightSnow,
    HeavySnow,
    LightRain,
    HeavyShowers,
    HeavyRain,
    LightSnowShowers,
    HeavySnowShowers,
    ThunderyHeavyRain,
    ThunderySnowShowers,
    Unknown,
}

impl Kind {
    pub fn from_code(code: u32) -> Self {
        match code {
            113 => Kind::Sunny,
            116 => Kind::PartlyCloudy,
            119 => Kind::Cloudy,
            122 => Kind::VeryCloudy,
            143 | 248 | 260 => Kind::Fog,
            176 | 263 | 353 => Kind::LightShowers,
            179 | 362 | 365 | 374 => Kind::LightSleetShowers,
            182 | 185 | 281 | 284 | 311 | 314 | 317 | 350 | 377 => Kind::LightSleet,
            200 | 386 => Kind::ThunderyShowers,
            227 | 320 => Kind::LightSnow,
            230 | 329 | 332 | 338 => Kind::HeavySnow,
            266 | 293 | 296 => Kind::LightRain,
            299 | 305 | 356 => Kind::HeavyShowers,
            302 | 308 | 359 => Kind::HeavyRain,
            323 | 326 | 368 => Kind::LightSnowShowers,
            335 | 371 | 395 => Kind::HeavySnowShowers,
            389 => Kind::ThunderyHeavyRain,
            392 => Kind::ThunderySnowShowers,
            _ => Kind::Unknown,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Kind::Sunny => "☀️",
            Kind::PartlyCloudy => "⛅",
            Kind::Cloudy | Kind::VeryCloudy => "☁️",
            Kind::Fog => "🌫",
            Kind::LightShowers | Kind::LightRain => "🌦",
            Kind::LightSleetShowers
            | Kind::LightSleet
            | Kind::HeavyShowers
            | Kind::HeavyRain => "🌧",
            Kind::ThunderyShowers | Kind::ThunderySnowShowers => "⛈",
            Kind::LightSnow | Kind::LightSnowShowers => "🌨",
            Kind::HeavySnow | Kind::HeavySnowShowers => "❄️",
            Kind::ThunderyHeavyRain => "🌩",
            Kind::Unknown => "✨",
        }
    }
}

/// The sixteen compass points wttr.in reports wind directions with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompassPoint {
    #[default]
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl FromStr for CompassPoint {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|point| point.as_str() == wanted)
            .ok_or_else(|| WeatherError::malformed(format!("unknown compass point '{s}'")))
    }
}

/// Where the wind blows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindDirection {
    pub point: CompassPoint,
    pub degrees: u16,
}

impl WindDirection {
    pub fn new(point: CompassPoint, degrees: u16) -> Self {
        Self { point, degrees }
    }

    /// Arrow showing where the wind blows to, in 45° sectors
    pub fn arrow(self) -> &'static str {
        const ARROWS: [&str; 8] = ["↓", "↙", "←", "↖", "↑", "↗", "→", "↘"];
        let sector = ((f64::from(self.degrees % 360) + 22.5) / 45.0) as usize % 8;
        ARROWS[sector]
    }
}

/// Renders as the compass point followed by the arrow, e.g. `NNE↙`
impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.point.as_str(), self.arrow())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UltraViolet {
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UltraViolet {
    pub fn new(index: u32) -> Self {
        Self { index }
    }

    pub fn category(self) -> UvCategory {
        match self.index {
            0..=2 => UvCategory::Low,
            3..=5 => UvCategory::Moderate,
            6..=7 => UvCategory::High,
            8..=10 => UvCategory::VeryHigh,
            _ => UvCategory::Extreme,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoonPhase {
    #[default]
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl FromStr for MoonPhase {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "New Moon" => Ok(MoonPhase::NewMoon),
            "Waxing Crescent" => Ok(MoonPhase::WaxingCrescent),
            "First Quarter" => Ok(MoonPhase::FirstQuarter),
            "Waxing Gibbous" => Ok(MoonPhase::WaxingGibbous),
            "Full Moon" => Ok(MoonPhase::FullMoon),
            "Waning Gibbous" => Ok(MoonPhase::WaningGibbous),
            "Last Quarter" => Ok(MoonPhase::LastQuarter),
            "Waning Crescent" => Ok(MoonPhase::WaningCrescent),
            other => Err(WeatherError::malformed(format!("unknown moon phase '{other}'"))),
        }
    }
}
