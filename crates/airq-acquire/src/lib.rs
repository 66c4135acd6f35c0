//! Location resolution and data acquisition
//!
//! Resolves place names to coordinates, fetches pollution and weather from a
//! remote provider, normalizes the payloads into canonical records, and falls
//! back to synthetic data when nothing live is available.

pub mod cache;
pub mod geocoder;
pub mod normalize;
pub mod orchestrator;
pub mod payload;
pub mod provider;
pub mod sample;
pub mod throttle;

pub use cache::*;
pub use geocoder::*;
pub use normalize::*;
pub use orchestrator::*;
pub use payload::*;
pub use provider::*;
pub use sample::*;
pub use throttle::*;

use airq_core::Coordinates;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("No coordinates found for: {0}")]
    GeocodeNotFound(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider returned status {status}: {body}")]
    ProviderErrorResponse { status: u16, body: String },

    #[error("No data available for: {0}")]
    NoDataForLocation(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Sample generation failed: {0}")]
    SampleGeneration(String),
}

impl From<reqwest::Error> for AcquireError {
    fn from(e: reqwest::Error) -> Self {
        AcquireError::ProviderUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for AcquireError {
    fn from(e: serde_json::Error) -> Self {
        AcquireError::InvalidPayload(e.to_string())
    }
}

pub type AcquireResult<T> = Result<T, AcquireError>;

/// A free-text geocoding backend
#[async_trait::async_trait]
pub trait GeocodingService: Send + Sync {
    /// Service name/identifier
    fn name(&self) -> &str;

    /// Look up one query string. `Ok(None)` means the service had no match.
    async fn search(&self, query: &str) -> AcquireResult<Option<(f64, f64)>>;
}

/// A remote source of pollution and weather readings
#[async_trait::async_trait]
pub trait AirQualityProvider: Send + Sync {
    /// Provider name/identifier
    fn name(&self) -> &str;

    async fn fetch_current_pollution(&self, at: Coordinates) -> AcquireResult<PollutionPayload>;

    async fn fetch_current_weather(&self, at: Coordinates) -> AcquireResult<WeatherPayload>;

    /// Weather forecast entries covering `horizon_days` days ahead
    async fn fetch_forecast(
        &self,
        at: Coordinates,
        horizon_days: u8,
    ) -> AcquireResult<Vec<ForecastEntry>>;

    /// Pollution for the hour ending at `time`
    async fn fetch_historical_pollution(
        &self,
        at: Coordinates,
        time: DateTime<Utc>,
    ) -> AcquireResult<PollutionPayload>;
}

/// A location name together with the coordinates it resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: String,
    pub coordinates: Coordinates,
}
