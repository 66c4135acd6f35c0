//! Raw provider payloads (OpenWeatherMap 2.5 schema)
//!
//! Only the fields the normalizer reads are modelled; everything else in the
//! JSON is ignored. Missing pollutant components read as zero.

use serde::{Deserialize, Serialize};

/// `/air_pollution` and `/air_pollution/history` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutionPayload {
    #[serde(default)]
    pub list: Vec<PollutionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionEntry {
    /// Unix timestamp of the measurement
    #[serde(default)]
    pub dt: Option<i64>,
    pub main: ProviderIndex,
    #[serde(default)]
    pub components: Components,
}

/// The provider's own 1-5 air quality index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderIndex {
    pub aqi: u8,
}

/// Concentrations in µg/m³
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub so2: f64,
}

/// `/weather` response body; also the shape of each forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub dt: Option<i64>,
    pub main: WeatherMain,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherMain {
    /// Degrees Celsius (requested with `units=metric`)
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Metres per second
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition group, e.g. "Rain" or "Clouds"
    pub main: String,
    #[serde(default)]
    pub description: String,
}

pub type ForecastEntry = WeatherPayload;

/// `/forecast` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}
