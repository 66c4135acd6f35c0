//! The canonical air quality record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aqi::{compute_aqi, AqiCategory};
use crate::weather::{WeatherConditions, WeatherLabel};

/// Pollutant concentrations after unit conversion
/// (pm in µg/m³, gases in ppb)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
}

impl PollutantReading {
    /// AQI computed from the concentrations themselves
    pub fn aqi(&self) -> u16 {
        compute_aqi(self.pm25, self.pm10, self.no2, self.o3)
    }

    /// Raise every value to at least `floor`
    pub fn clamped(self, floor: f64) -> Self {
        Self {
            pm25: self.pm25.max(floor),
            pm10: self.pm10.max(floor),
            no2: self.no2.max(floor),
            o3: self.o3.max(floor),
        }
    }
}

/// One row of the dashboard table.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRecord {
    pub timestamp: DateTime<Utc>,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed: f64,
    pub aqi: u16,
    pub aqi_category: AqiCategory,
    pub aqi_color: String,
    pub weather_label: WeatherLabel,
}

/// Column names of [`AirQualityRecord`], in order
pub const RECORD_FIELDS: [&str; 15] = [
    "timestamp",
    "location_name",
    "latitude",
    "longitude",
    "pm25",
    "pm10",
    "no2",
    "o3",
    "temperature_c",
    "humidity_pct",
    "wind_speed",
    "aqi",
    "aqi_category",
    "aqi_color",
    "weather_label",
];

impl AirQualityRecord {
    /// Assemble a record; category and color follow from `aqi`.
    pub fn new(
        timestamp: DateTime<Utc>,
        location_name: impl Into<String>,
        (latitude, longitude): (f64, f64),
        reading: PollutantReading,
        weather: WeatherConditions,
        aqi: u16,
    ) -> Self {
        let category = AqiCategory::from_aqi(i32::from(aqi));
        Self {
            timestamp,
            location_name: location_name.into(),
            latitude,
            longitude,
            pm25: reading.pm25,
            pm10: reading.pm10,
            no2: reading.no2,
            o3: reading.o3,
            temperature_c: weather.temperature_c,
            humidity_pct: weather.humidity_pct,
            wind_speed: weather.wind_speed,
            aqi,
            aqi_category: category,
            aqi_color: category.color().to_string(),
            weather_label: weather.label,
        }
    }

    /// Calendar day (UTC) the record belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn reading(&self) -> PollutantReading {
        PollutantReading {
            pm25: self.pm25,
            pm10: self.pm10,
            no2: self.no2,
            o3: self.o3,
        }
    }
}
