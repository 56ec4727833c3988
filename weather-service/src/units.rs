//! Unit systems and wttr.in locales

use crate::error::WeatherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which measurement system the forecast is read in
///
/// wttr.in reports every quantity in both systems under different keys;
/// the unit decides which keys are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Imperial,
    Metric,
}

impl Unit {
    /// Suffix of temperature keys (`temp_F`, `FeelsLikeC`, `maxtempF`)
    pub fn temperature(self) -> &'static str {
        match self {
            Unit::Imperial => "F",
            Unit::Metric => "C",
        }
    }

    /// Suffix of wind speed keys (`windspeedMiles`, `windspeedKmph`)
    pub fn velocity(self) -> &'static str {
        match self {
            Unit::Imperial => "Miles",
            Unit::Metric => "Kmph",
        }
    }

    pub fn precipitation(self) -> &'static str {
        match self {
            Unit::Imperial => "Inches",
            Unit::Metric => "MM",
        }
    }

    pub fn pressure(self) -> &'static str {
        match self {
            Unit::Imperial => "Inches",
            Unit::Metric => "",
        }
    }

    pub fn visibility(self) -> &'static str {
        match self {
            Unit::Imperial => "Miles",
            Unit::Metric => "",
        }
    }

    /// Snowfall is always reported in centimeters
    pub fn snow_divisor(self) -> f64 {
        match self {
            Unit::Imperial => 2.54,
            Unit::Metric => 1.0,
        }
    }
}

impl FromStr for Unit {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "imperial" => Ok(Unit::Imperial),
            "metric" => Ok(Unit::Metric),
            other => Err(WeatherError::Configuration(format!("unknown unit system '{other}'"))),
        }
    }
}

/// Languages served by wttr.in subdomains
const LOCALES: &[&str] = &[
    "af", "am", "ar", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "eo",
    "es", "et", "eu", "fa", "fi", "fr", "fy", "ga", "gl", "he", "hi", "hr", "hu", "hy", "ia",
    "id", "is", "it", "ja", "jv", "ka", "kk", "ko", "ky", "lt", "lv", "mg", "mk", "ml", "mr",
    "nb", "nl", "nn", "oc", "pl", "pt", "pt-br", "ro", "ru", "sk", "sl", "sr", "sr-lat", "sv",
    "sw", "ta", "te", "th", "tr", "uk", "uz", "vi", "zh", "zh-cn", "zh-tw", "zu",
];

/// A wttr.in language code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale(&'static str);

impl Locale {
    pub const ENGLISH: Locale = Locale("en");

    pub fn code(self) -> &'static str {
        self.0
    }

    pub fn is_english(self) -> bool {
        self == Self::ENGLISH
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::ENGLISH
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for Locale {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LOCALES
            .iter()
            .copied()
            .find(|code| *code == wanted)
            .map(Locale)
            .ok_or_else(|| WeatherError::Configuration(format!("unsupported locale '{s}'")))
    }
}
