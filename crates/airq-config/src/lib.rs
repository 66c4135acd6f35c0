use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const CONFIG_PATH_VAR: &str = "AIRQ_CONFIG";
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "airq.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Pause between locations
    pub call_delay_ms: Option<u64>,
    /// Pause between historical calls
    pub history_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeocoderConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub min_delay_ms: Option<u64>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SampleConfig {
    pub seed: Option<u64>,
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    pub locations: Option<Vec<String>>,
    pub include_history: Option<bool>,
    pub history_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub provider: Option<ProviderConfig>,
    pub geocoder: Option<GeocoderConfig>,
    pub cache: Option<CacheConfig>,
    pub sample: Option<SampleConfig>,
    pub dashboard: Option<DashboardConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("Missing credential: set OPENWEATHER_API_KEY or provider.api_key")]
    MissingCredential,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

impl AppConfig {
    /// Load configuration from the AIRQ_CONFIG path (TOML) if present, then
    /// apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            AppConfig::default()
        };
        cfg.override_api_key(std::env::var(API_KEY_VAR).ok().as_deref());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<AppConfig>(s)?)
    }

    /// A non-blank `key` replaces the file's API key
    pub fn override_api_key(&mut self, key: Option<&str>) {
        if let Some(key) = non_blank(key) {
            self.provider.get_or_insert_with(Default::default).api_key = Some(key);
        }
    }

    /// Check that every configured base URL parses as http(s)
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("provider.base_url", &self.provider_base_url())?;
        check_url("geocoder.base_url", &self.geocoder_base_url())?;
        Ok(())
    }

    fn provider_section(&self) -> ProviderConfig {
        self.provider.clone().unwrap_or_default()
    }

    fn geocoder_section(&self) -> GeocoderConfig {
        self.geocoder.clone().unwrap_or_default()
    }

    /// Provider API key; blank counts as absent
    pub fn api_key(&self) -> Option<String> {
        non_blank(self.provider.as_ref().and_then(|p| p.api_key.as_deref()))
    }

    pub fn require_api_key(&self) -> Result<String, ConfigError> {
        self.api_key().ok_or(ConfigError::MissingCredential)
    }

    /// Provider base URL (default https://api.openweathermap.org)
    pub fn provider_base_url(&self) -> String {
        self.provider_section()
            .base_url
            .unwrap_or_else(|| "https://api.openweathermap.org".to_string())
    }

    /// HTTP timeout for provider and geocoder calls (default 10s)
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_section().timeout_secs.unwrap_or(10))
    }

    /// Pause between locations (default 1000ms)
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.provider_section().call_delay_ms.unwrap_or(1000))
    }

    /// Pause between historical calls (default 500ms)
    pub fn history_delay(&self) -> Duration {
        Duration::from_millis(self.provider_section().history_delay_ms.unwrap_or(500))
    }

    /// Geocoder base URL (default https://nominatim.openstreetmap.org)
    pub fn geocoder_base_url(&self) -> String {
        self.geocoder_section()
            .base_url
            .unwrap_or_else(|| "https://nominatim.openstreetmap.org".to_string())
    }

    pub fn geocoder_user_agent(&self) -> String {
        self.geocoder_section()
            .user_agent
            .unwrap_or_else(|| "air_quality_dashboard_app".to_string())
    }

    /// Minimum spacing between geocoder calls (default 1000ms)
    pub fn geocoder_min_delay(&self) -> Duration {
        Duration::from_millis(self.geocoder_section().min_delay_ms.unwrap_or(1000))
    }

    pub fn geocoder_retries(&self) -> u32 {
        self.geocoder_section().retries.unwrap_or(2)
    }

    /// Response cache lifetime (default 1h)
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.cache
                .as_ref()
                .and_then(|c| c.ttl_secs)
                .unwrap_or(3600),
        )
    }

    pub fn sample_seed(&self) -> u64 {
        self.sample.as_ref().and_then(|s| s.seed).unwrap_or(42)
    }

    pub fn sample_days(&self) -> u32 {
        self.sample.as_ref().and_then(|s| s.days).unwrap_or(7)
    }

    /// Configured default locations, if any
    pub fn locations(&self) -> Option<Vec<String>> {
        self.dashboard
            .as_ref()
            .and_then(|d| d.locations.clone())
            .filter(|l| !l.is_empty())
    }

    pub fn include_history(&self) -> bool {
        self.dashboard
            .as_ref()
            .and_then(|d| d.include_history)
            .unwrap_or(true)
    }

    pub fn history_days(&self) -> u32 {
        self.dashboard
            .as_ref()
            .and_then(|d| d.history_days)
            .unwrap_or(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.provider_base_url(), "https://api.openweathermap.org");
        assert_eq!(cfg.geocoder_base_url(), "https://nominatim.openstreetmap.org");
        assert_eq!(cfg.geocoder_user_agent(), "air_quality_dashboard_app");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.call_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.history_delay(), Duration::from_millis(500));
        assert_eq!(cfg.geocoder_min_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.geocoder_retries(), 2);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(cfg.sample_seed(), 42);
        assert_eq!(cfg.sample_days(), 7);
        assert!(cfg.include_history());
        assert_eq!(cfg.history_days(), 7);
        assert!(cfg.locations().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_sections() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [provider]
            api_key = "abc123"
            timeout_secs = 3

            [geocoder]
            retries = 0

            [cache]
            ttl_secs = 60

            [dashboard]
            locations = ["London, UK", "Reykjavik"]
            include_history = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api_key().as_deref(), Some("abc123"));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.geocoder_retries(), 0);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(60));
        assert_eq!(
            cfg.locations(),
            Some(vec!["London, UK".to_string(), "Reykjavik".to_string()])
        );
        assert!(!cfg.include_history());
    }

    #[test]
    fn blank_key_is_missing() {
        let cfg = AppConfig::from_toml_str("[provider]\napi_key = \"  \"\n").unwrap();
        assert!(cfg.api_key().is_none());
        assert!(matches!(
            cfg.require_api_key(),
            Err(ConfigError::MissingCredential)
        ));
    }

    #[test]
    fn env_key_overrides_file() {
        let mut cfg = AppConfig::from_toml_str("[provider]\napi_key = \"file\"\n").unwrap();
        cfg.override_api_key(Some(""));
        assert_eq!(cfg.api_key().as_deref(), Some("file"));
        cfg.override_api_key(Some("env"));
        assert_eq!(cfg.require_api_key().unwrap(), "env");

        let mut empty = AppConfig::default();
        empty.override_api_key(Some("env"));
        assert_eq!(empty.api_key().as_deref(), Some("env"));
    }

    #[test]
    fn rejects_bad_urls() {
        let cfg = AppConfig::from_toml_str("[provider]\nbase_url = \"not a url\"\n").unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUrl {
                field: "provider.base_url",
                ..
            })
        ));

        let cfg = AppConfig::from_toml_str("[geocoder]\nbase_url = \"ftp://example.com\"\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_toml_is_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[provider\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airq.toml");
        fs::write(&path, "[sample]\nseed = 7\ndays = 3\n").unwrap();
        let cfg = AppConfig::from_path(&path).unwrap();
        assert_eq!(cfg.sample_seed(), 7);
        assert_eq!(cfg.sample_days(), 3);
    }
}
