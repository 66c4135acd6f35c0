//! Place-name resolution with query variants, retries, spacing, and caching

use std::time::Duration;

use airq_core::Coordinates;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::cache::{ResponseCache, TtlCache, DEFAULT_CACHE_TTL};
use crate::throttle::Throttle;
use crate::{AcquireError, AcquireResult, GeocodingService};

/// Builds one query string from the user's input
pub type QueryTemplate = fn(&str) -> String;

/// Query variants tried in order on every attempt. Short or ambiguous names
/// often only match in one of the expanded forms.
pub const QUERY_TEMPLATES: [QueryTemplate; 4] = [exact, doubled, city_of, with_country];

fn exact(name: &str) -> String {
    name.to_string()
}

fn doubled(name: &str) -> String {
    format!("{name}, {name}")
}

fn city_of(name: &str) -> String {
    format!("city of {name}")
}

fn with_country(name: &str) -> String {
    format!("{name}, country")
}

pub const DEFAULT_GEOCODER_RETRIES: u32 = 2;
pub const DEFAULT_GEOCODER_DELAY: Duration = Duration::from_secs(1);

/// Resolves free-text names to coordinates through a [`GeocodingService`]
pub struct Geocoder {
    service: Box<dyn GeocodingService>,
    templates: Vec<QueryTemplate>,
    retries: u32,
    throttle: Throttle,
    cache: Box<dyn ResponseCache<String, Coordinates>>,
}

impl Geocoder {
    pub fn new(service: Box<dyn GeocodingService>) -> Self {
        Self {
            service,
            templates: QUERY_TEMPLATES.to_vec(),
            retries: DEFAULT_GEOCODER_RETRIES,
            throttle: Throttle::new(DEFAULT_GEOCODER_DELAY),
            cache: Box::new(TtlCache::new(DEFAULT_CACHE_TTL)),
        }
    }

    /// Additional full passes over the templates after the first
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.throttle = Throttle::new(min_delay);
        self
    }

    pub fn with_cache(mut self, cache: Box<dyn ResponseCache<String, Coordinates>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_templates(mut self, templates: Vec<QueryTemplate>) -> Self {
        self.templates = templates;
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Resolve `name` to coordinates.
    ///
    /// Tries every template once per attempt, for `retries + 1` attempts.
    /// Service errors and out-of-range or `(0, 0)` results count as misses.
    /// Only successful lookups are cached.
    #[instrument(skip(self), fields(service = %self.service.name()))]
    pub async fn resolve(&self, name: &str) -> AcquireResult<Coordinates> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AcquireError::GeocodeNotFound(name.to_string()));
        }

        let key = name.to_string();
        if let Some(hit) = self.cache.get(&key) {
            debug!("Geocode cache hit");
            return Ok(hit);
        }

        for attempt in 0..=self.retries {
            for template in &self.templates {
                let query = template(name);
                self.throttle.wait().await;

                match self.service.search(&query).await {
                    Ok(Some((latitude, longitude))) => match Coordinates::new(latitude, longitude) {
                        Ok(coordinates) => {
                            debug!(%query, latitude, longitude, "Resolved location");
                            self.cache.insert(key, coordinates);
                            return Ok(coordinates);
                        }
                        Err(e) => debug!(%query, error = %e, "Rejected geocoding result"),
                    },
                    Ok(None) => debug!(%query, "No match"),
                    Err(e) => {
                        if attempt == self.retries {
                            warn!(%query, error = %e, "Geocoding request failed");
                        } else {
                            debug!(%query, attempt, error = %e, "Geocoding request failed");
                        }
                    }
                }
            }
        }

        warn!("Could not find coordinates");
        Err(AcquireError::GeocodeNotFound(name.to_string()))
    }
}

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "air_quality_dashboard_app";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search API
pub struct NominatimService {
    client: reqwest::Client,
    search_url: Url,
}

impl NominatimService {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> AcquireResult<Self> {
        let search_url = Url::parse(base_url)
            .and_then(|base| base.join("search"))
            .map_err(|e| AcquireError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, search_url })
    }
}

#[async_trait::async_trait]
impl GeocodingService for NominatimService {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn search(&self, query: &str) -> AcquireResult<Option<(f64, f64)>> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("accept-language", "en"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AcquireError::ProviderErrorResponse {
                status: status.as_u16(),
                body,
            });
        }

        let places: Vec<NominatimPlace> = serde_json::from_str(&body)?;
        let Some(place) = places.first() else {
            return Ok(None);
        };
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|e| AcquireError::InvalidPayload(format!("lat {:?}: {e}", place.lat)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|e| AcquireError::InvalidPayload(format!("lon {:?}: {e}", place.lon)))?;
        Ok(Some((latitude, longitude)))
    }
}
