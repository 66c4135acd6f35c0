//! Acquisition orchestrator: resolve, fetch, normalize, fall back

use std::fmt;

use airq_core::{preset_coordinates, AirQualityRecord, Coordinates};
use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use tokio::time::{sleep, Duration};
use tracing::{info, instrument, warn};

use crate::geocoder::Geocoder;
use crate::normalize::{normalize, normalize_forecast, normalize_historical};
use crate::sample::SampleDataGenerator;
use crate::{AcquireError, AcquireResult, AirQualityProvider, ResolvedLocation};

/// Where the rows of a [`LoadOutcome`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Live provider data
    Live,
    /// Synthetic data, requested or forced by a missing provider
    Sample,
    /// Synthetic data after every live location came back empty
    SampleFallback,
    /// Nothing was requested, or nothing could be produced
    Empty,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Provenance::Live => "live",
            Provenance::Sample => "sample",
            Provenance::SampleFallback => "sample (fallback)",
            Provenance::Empty => "empty",
        };
        f.write_str(s)
    }
}

/// A location that produced no live records, with the reason
#[derive(Debug)]
pub struct SkippedLocation {
    pub location: String,
    pub reason: AcquireError,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub records: Vec<AirQualityRecord>,
    pub skipped: Vec<SkippedLocation>,
    pub provenance: Provenance,
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Pacing and scope of a live load
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Pause between successive locations
    pub call_delay: Duration,
    /// Pause between successive historical calls
    pub history_delay: Duration,
    pub include_history: bool,
    pub history_days: u32,
    /// Zero disables forecast rows
    pub forecast_days: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_millis(1000),
            history_delay: Duration::from_millis(500),
            include_history: true,
            history_days: 7,
            forecast_days: 5,
        }
    }
}

pub struct Orchestrator {
    geocoder: Geocoder,
    provider: Option<Box<dyn AirQualityProvider>>,
    sample: SampleDataGenerator,
    options: LoadOptions,
}

impl Orchestrator {
    /// `provider` is `None` when no credential is configured; every load is
    /// then served from `sample`.
    pub fn new(
        geocoder: Geocoder,
        provider: Option<Box<dyn AirQualityProvider>>,
        sample: SampleDataGenerator,
    ) -> Self {
        Self {
            geocoder,
            provider,
            sample,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn sample_generator(&self) -> &SampleDataGenerator {
        &self.sample
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Build the record table for `locations`, in order.
    ///
    /// Locations that fail are skipped and reported in
    /// [`LoadOutcome::skipped`]. If no location yields a live record the
    /// whole list is served from the sample generator instead.
    #[instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn load(&self, locations: &[String], use_sample: bool) -> LoadOutcome {
        if locations.is_empty() {
            info!("No locations requested");
            return LoadOutcome {
                records: Vec::new(),
                skipped: Vec::new(),
                provenance: Provenance::Empty,
            };
        }

        let provider = match (&self.provider, use_sample) {
            (Some(provider), false) => provider.as_ref(),
            (None, false) => {
                info!("No provider configured, using sample data");
                return self.from_sample(locations, Vec::new(), Provenance::Sample);
            }
            (_, true) => return self.from_sample(locations, Vec::new(), Provenance::Sample),
        };

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (i, name) in locations.iter().enumerate() {
            if i > 0 && !self.options.call_delay.is_zero() {
                sleep(self.options.call_delay).await;
            }
            match self.load_location(provider, name).await {
                Ok(rows) => {
                    info!(location = %name, rows = rows.len(), "Loaded location");
                    records.extend(rows);
                }
                Err(e) => {
                    warn!(location = %name, error = %e, "Skipping location");
                    skipped.push(SkippedLocation {
                        location: name.clone(),
                        reason: e,
                    });
                }
            }
        }

        if records.is_empty() {
            warn!("No live data for any location, falling back to sample data");
            return self.from_sample(locations, skipped, Provenance::SampleFallback);
        }

        LoadOutcome {
            records,
            skipped,
            provenance: Provenance::Live,
        }
    }

    fn from_sample(
        &self,
        locations: &[String],
        skipped: Vec<SkippedLocation>,
        provenance: Provenance,
    ) -> LoadOutcome {
        match self.sample.generate(locations) {
            Ok(records) => LoadOutcome {
                records,
                skipped,
                provenance,
            },
            Err(e) => {
                warn!(error = %e, "Sample generation failed");
                LoadOutcome {
                    records: Vec::new(),
                    skipped,
                    provenance: Provenance::Empty,
                }
            }
        }
    }

    /// Preset table first, then live geocoding
    async fn resolve(&self, name: &str) -> AcquireResult<Coordinates> {
        match preset_coordinates(name) {
            Some(coordinates) => Ok(coordinates),
            None => self.geocoder.resolve(name).await,
        }
    }

    /// Current, forecast, and historical rows for one location. Errors only
    /// when nothing at all came back.
    async fn load_location(
        &self,
        provider: &dyn AirQualityProvider,
        name: &str,
    ) -> AcquireResult<Vec<AirQualityRecord>> {
        let location = ResolvedLocation {
            name: name.to_string(),
            coordinates: self.resolve(name).await?,
        };
        let at = location.coordinates;
        let mut records = Vec::new();
        let mut last_error = None;

        let pollution = match provider.fetch_current_pollution(at).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(location = %name, error = %e, "Current pollution unavailable");
                last_error = Some(e);
                None
            }
        };
        let weather = match provider.fetch_current_weather(at).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(location = %name, error = %e, "Current weather unavailable, using defaults");
                None
            }
        };

        if let Some(current) = pollution.as_ref().filter(|p| !p.list.is_empty()) {
            records.extend(normalize(current, weather.as_ref(), &location));

            if self.options.forecast_days > 0 {
                match provider.fetch_forecast(at, self.options.forecast_days).await {
                    Ok(entries) => records.extend(
                        entries
                            .iter()
                            .filter_map(|entry| normalize_forecast(current, entry, &location)),
                    ),
                    Err(e) => {
                        warn!(location = %name, error = %e, "Forecast unavailable");
                        last_error = Some(e);
                    }
                }
            }
        }

        if self.options.include_history {
            let anchor = history_anchor(Utc::now());
            for day in 1..=self.options.history_days {
                if day > 1 && !self.options.history_delay.is_zero() {
                    sleep(self.options.history_delay).await;
                }
                let time = anchor - ChronoDuration::days(i64::from(day));
                match provider.fetch_historical_pollution(at, time).await {
                    Ok(payload) => {
                        records.extend(normalize_historical(&payload, &location, time))
                    }
                    Err(e) => {
                        warn!(
                            location = %name,
                            day,
                            error = %e,
                            "Historical pollution unavailable"
                        );
                        last_error = Some(e);
                    }
                }
            }
        }

        if records.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| AcquireError::NoDataForLocation(name.to_string())));
        }
        Ok(records)
    }
}

/// Truncate to the hour so repeated loads within the hour share cache keys
pub fn history_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(ChronoDuration::hours(1)).unwrap_or(now)
}
