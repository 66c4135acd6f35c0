//! Turns provider payloads into canonical records

use airq_core::{
    aqi_from_provider_index, to_reporting_unit, AirQualityRecord, Pollutant, PollutantReading,
    WeatherConditions, WeatherLabel,
};
use chrono::{DateTime, Utc};

use crate::payload::{Components, ForecastEntry, PollutionEntry, PollutionPayload, WeatherPayload};
use crate::ResolvedLocation;

/// Convert provider components (all µg/m³) to dashboard units
pub fn reading_from_components(components: &Components) -> PollutantReading {
    PollutantReading {
        pm25: to_reporting_unit(components.pm2_5, Pollutant::Pm25),
        pm10: to_reporting_unit(components.pm10, Pollutant::Pm10),
        no2: to_reporting_unit(components.no2, Pollutant::No2),
        o3: to_reporting_unit(components.o3, Pollutant::O3),
    }
}

/// Surface weather from a current-weather payload or forecast entry
pub fn conditions_from_weather(weather: &WeatherPayload) -> WeatherConditions {
    let defaults = WeatherConditions::default();
    WeatherConditions {
        temperature_c: weather.main.temp,
        humidity_pct: weather.main.humidity,
        wind_speed: weather.wind.map_or(defaults.wind_speed, |w| w.speed),
        label: weather
            .weather
            .first()
            .map(|c| WeatherLabel::from_condition(&c.main))
            .unwrap_or_default(),
    }
}

fn timestamp_or_now(dt: Option<i64>) -> DateTime<Utc> {
    dt.and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}

fn build_record(
    entry: &PollutionEntry,
    weather: WeatherConditions,
    timestamp: DateTime<Utc>,
    location: &ResolvedLocation,
) -> AirQualityRecord {
    AirQualityRecord::new(
        timestamp,
        location.name.as_str(),
        (
            location.coordinates.latitude(),
            location.coordinates.longitude(),
        ),
        reading_from_components(&entry.components),
        weather,
        aqi_from_provider_index(entry.main.aqi),
    )
}

/// Current conditions for one location.
///
/// Returns `None` when the pollution payload carries no readings. Absent
/// weather falls back to [`WeatherConditions::default`].
pub fn normalize(
    pollution: &PollutionPayload,
    weather: Option<&WeatherPayload>,
    location: &ResolvedLocation,
) -> Option<AirQualityRecord> {
    let entry = pollution.list.first()?;
    let conditions = weather.map(conditions_from_weather).unwrap_or_default();
    Some(build_record(
        entry,
        conditions,
        timestamp_or_now(entry.dt),
        location,
    ))
}

/// A future-dated row: the forecast entry's weather and time paired with the
/// current pollutant readings.
pub fn normalize_forecast(
    pollution: &PollutionPayload,
    forecast: &ForecastEntry,
    location: &ResolvedLocation,
) -> Option<AirQualityRecord> {
    let entry = pollution.list.first()?;
    Some(build_record(
        entry,
        conditions_from_weather(forecast),
        timestamp_or_now(forecast.dt),
        location,
    ))
}

/// A trend row from historical pollution, which has no weather attached.
/// An entry without its own time is stamped with `requested`, the end of the
/// window that was asked for.
pub fn normalize_historical(
    pollution: &PollutionPayload,
    location: &ResolvedLocation,
    requested: DateTime<Utc>,
) -> Option<AirQualityRecord> {
    let entry = pollution.list.first()?;
    let conditions = WeatherConditions {
        label: WeatherLabel::Historical,
        ..WeatherConditions::default()
    };
    let timestamp = entry
        .dt
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(requested);
    Some(build_record(entry, conditions, timestamp, location))
}
