//! OpenWeatherMap client for pollution, weather, forecast, and history

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use airq_core::Coordinates;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::cache::{ResponseCache, TtlCache, DEFAULT_CACHE_TTL};
use crate::payload::{ForecastEntry, ForecastPayload, PollutionPayload, WeatherPayload};
use crate::{AcquireError, AcquireResult, AirQualityProvider};

pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// The forecast endpoint returns 3-hourly steps, at most 40 of them
const FORECAST_STEPS_PER_DAY: u16 = 8;
const MAX_FORECAST_STEPS: u16 = 40;

/// Width of the window requested from the history endpoint
const HISTORY_WINDOW_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CurrentPollution,
    CurrentWeather,
    Forecast,
    HistoricalPollution,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Operation::CurrentPollution => "/data/2.5/air_pollution",
            Operation::CurrentWeather => "/data/2.5/weather",
            Operation::Forecast => "/data/2.5/forecast",
            Operation::HistoricalPollution => "/data/2.5/air_pollution/history",
        }
    }

    /// Weather endpoints default to Kelvin unless asked otherwise
    fn wants_metric(self) -> bool {
        matches!(self, Operation::CurrentWeather | Operation::Forecast)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CurrentPollution => "current_pollution",
            Operation::CurrentWeather => "current_weather",
            Operation::Forecast => "forecast",
            Operation::HistoricalPollution => "historical_pollution",
        };
        f.write_str(name)
    }
}

/// Live provider backed by the OpenWeatherMap 2.5 REST API.
///
/// Successful response bodies are cached per operation, coordinates, and
/// extra parameters. Non-2xx statuses and transport failures are returned
/// as errors and never cached.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Arc<dyn ResponseCache<String, String>>,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AcquireResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AcquireError::ConfigurationMissing(
                "OpenWeatherMap API key".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache: Arc::new(TtlCache::new(DEFAULT_CACHE_TTL)),
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache<String, String>>) -> Self {
        self.cache = cache;
        self
    }

    fn cache_key(op: Operation, at: Coordinates, extra: &[(&str, String)]) -> String {
        // same textual form as the request parameters
        let mut key = format!("{op}:{}:{}", at.latitude(), at.longitude());
        for (name, value) in extra {
            key.push_str(&format!(":{name}={value}"));
        }
        key
    }

    #[instrument(skip(self, extra), fields(lat = at.latitude(), lon = at.longitude()))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        op: Operation,
        at: Coordinates,
        extra: &[(&str, String)],
    ) -> AcquireResult<T> {
        let key = Self::cache_key(op, at, extra);
        if let Some(body) = self.cache.get(&key) {
            debug!("Provider cache hit");
            return Ok(serde_json::from_str(&body)?);
        }

        let url = format!("{}{}", self.base_url, op.path());
        let mut query: Vec<(&str, String)> = vec![
            ("lat", at.latitude().to_string()),
            ("lon", at.longitude().to_string()),
            ("appid", self.api_key.clone()),
        ];
        if op.wants_metric() {
            query.push(("units", "metric".to_string()));
        }
        query.extend(extra.iter().cloned());

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Provider returned an error");
            return Err(AcquireError::ProviderErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = serde_json::from_str(&body)?;
        self.cache.insert(key, body);
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl AirQualityProvider for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn fetch_current_pollution(&self, at: Coordinates) -> AcquireResult<PollutionPayload> {
        self.get_json(Operation::CurrentPollution, at, &[]).await
    }

    async fn fetch_current_weather(&self, at: Coordinates) -> AcquireResult<WeatherPayload> {
        self.get_json(Operation::CurrentWeather, at, &[]).await
    }

    async fn fetch_forecast(
        &self,
        at: Coordinates,
        horizon_days: u8,
    ) -> AcquireResult<Vec<ForecastEntry>> {
        let steps = (u16::from(horizon_days) * FORECAST_STEPS_PER_DAY).min(MAX_FORECAST_STEPS);
        let payload: ForecastPayload = self
            .get_json(Operation::Forecast, at, &[("cnt", steps.to_string())])
            .await?;
        Ok(payload.list)
    }

    async fn fetch_historical_pollution(
        &self,
        at: Coordinates,
        time: DateTime<Utc>,
    ) -> AcquireResult<PollutionPayload> {
        let end = time.timestamp();
        let start = end - HISTORY_WINDOW_SECS;
        self.get_json(
            Operation::HistoricalPollution,
            at,
            &[("start", start.to_string()), ("end", end.to_string())],
        )
        .await
    }
}
