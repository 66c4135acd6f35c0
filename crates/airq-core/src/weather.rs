//! Weather condition labels and the rules that derive them

use serde::{Deserialize, Serialize};

/// Coarse weather condition shown next to each reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherLabel {
    Sunny,
    #[default]
    PartlyCloudy,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    /// Marks rows rebuilt from historical pollution data, which carries no weather
    Historical,
}

impl WeatherLabel {
    pub fn emoji(self) -> &'static str {
        match self {
            WeatherLabel::Sunny => "☀️",
            WeatherLabel::PartlyCloudy => "⛅",
            WeatherLabel::Cloudy => "☁️",
            WeatherLabel::Rainy => "🌧️",
            WeatherLabel::Stormy => "⛈️",
            WeatherLabel::Snowy => "❄️",
            WeatherLabel::Foggy => "🌫️",
            WeatherLabel::Historical => "📅",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherLabel::Sunny => "sunny",
            WeatherLabel::PartlyCloudy => "partly_cloudy",
            WeatherLabel::Cloudy => "cloudy",
            WeatherLabel::Rainy => "rainy",
            WeatherLabel::Stormy => "stormy",
            WeatherLabel::Snowy => "snowy",
            WeatherLabel::Foggy => "foggy",
            WeatherLabel::Historical => "historical",
        }
    }

    /// Label for a provider condition string such as "Rain" or "overcast clouds".
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();
        CONDITION_RULES
            .iter()
            .find(|(needle, _)| condition.contains(needle))
            .map(|(_, label)| *label)
            .unwrap_or_default()
    }

    /// Fallback label when only a temperature is known
    pub fn from_temperature(temp_c: f64) -> Self {
        if temp_c < 0.0 {
            WeatherLabel::Snowy
        } else if temp_c < 10.0 {
            WeatherLabel::Rainy
        } else if temp_c < 20.0 {
            WeatherLabel::PartlyCloudy
        } else {
            WeatherLabel::Sunny
        }
    }
}

impl std::fmt::Display for WeatherLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring rules, first match wins. Needles are lower case.
pub const CONDITION_RULES: &[(&str, WeatherLabel)] = &[
    ("rain", WeatherLabel::Rainy),
    ("drizzle", WeatherLabel::Rainy),
    ("shower", WeatherLabel::Rainy),
    ("thunder", WeatherLabel::Stormy),
    ("storm", WeatherLabel::Stormy),
    ("lightning", WeatherLabel::Stormy),
    ("snow", WeatherLabel::Snowy),
    ("sleet", WeatherLabel::Snowy),
    ("blizzard", WeatherLabel::Snowy),
    ("fog", WeatherLabel::Foggy),
    ("mist", WeatherLabel::Foggy),
    ("haze", WeatherLabel::Foggy),
    ("cloud", WeatherLabel::Cloudy),
    ("overcast", WeatherLabel::Cloudy),
    ("clear", WeatherLabel::Sunny),
    ("sunny", WeatherLabel::Sunny),
    ("fair", WeatherLabel::Sunny),
];

/// Surface weather attached to a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherConditions {
    pub temperature_c: f64,
    /// Relative humidity, 0-100
    pub humidity_pct: f64,
    /// Metres per second
    pub wind_speed: f64,
    pub label: WeatherLabel,
}

impl Default for WeatherConditions {
    /// Stand-in used when the provider returned no weather
    fn default() -> Self {
        Self {
            temperature_c: 20.0,
            humidity_pct: 50.0,
            wind_speed: 2.5,
            label: WeatherLabel::PartlyCloudy,
        }
    }
}
