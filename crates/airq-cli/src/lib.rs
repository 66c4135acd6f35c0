//! Command-line harness around the acquisition pipeline

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::{info, warn};

use airq_acquire::{
    AirQualityProvider, Geocoder, LoadOptions, LoadOutcome, NominatimService, OpenWeatherClient,
    Orchestrator, SampleDataGenerator, TtlCache,
};
use airq_config::AppConfig;
use airq_core::{filter_records, latest_by_location, preset_names, AirQualityRecord, RecordFilter};
use airq_sinks::{default_export_name, write_records};

/// Locations shown when neither the command line nor the config names any
const FALLBACK_LOCATION_COUNT: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "airq")]
#[command(about = "Fetch air quality readings and export them as CSV")]
#[command(version)]
pub struct Args {
    /// Use seeded sample data instead of the live provider
    #[arg(long)]
    pub sample: bool,

    /// First day kept in the export (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day kept in the export (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(
        short,
        long,
        help = "Output CSV path [default: air_quality_data_<from>_to_<to>.csv]"
    )]
    pub output: Option<PathBuf>,

    /// Place names; presets resolve without geocoding
    pub locations: Vec<String>,
}

/// Command line first, then config, then the first presets
pub fn select_locations(requested: &[String], cfg: &AppConfig) -> Vec<String> {
    let requested: Vec<String> = requested
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if !requested.is_empty() {
        return requested;
    }
    cfg.locations().unwrap_or_else(|| {
        preset_names()
            .take(FALLBACK_LOCATION_COUNT)
            .map(str::to_string)
            .collect()
    })
}

/// Wire the pipeline from configuration. Without an API key the returned
/// orchestrator serves sample data only.
pub fn build_orchestrator(cfg: &AppConfig) -> Result<Orchestrator> {
    let nominatim = NominatimService::new(
        &cfg.geocoder_base_url(),
        &cfg.geocoder_user_agent(),
        cfg.request_timeout(),
    )
    .context("Failed to build geocoding client")?;
    let geocoder = Geocoder::new(Box::new(nominatim))
        .with_retries(cfg.geocoder_retries())
        .with_min_delay(cfg.geocoder_min_delay())
        .with_cache(Box::new(TtlCache::new(cfg.cache_ttl())));

    let provider: Option<Box<dyn AirQualityProvider>> = match cfg.api_key() {
        Some(key) => {
            let client =
                OpenWeatherClient::new(&cfg.provider_base_url(), &key, cfg.request_timeout())
                    .context("Failed to build provider client")?
                    .with_cache(std::sync::Arc::new(TtlCache::new(cfg.cache_ttl())));
            Some(Box::new(client))
        }
        None => {
            warn!("No OpenWeatherMap API key configured, only sample data is available");
            None
        }
    };

    let options = LoadOptions {
        call_delay: cfg.call_delay(),
        history_delay: cfg.history_delay(),
        include_history: cfg.include_history(),
        history_days: cfg.history_days(),
        ..LoadOptions::default()
    };

    Ok(Orchestrator::new(
        geocoder,
        provider,
        SampleDataGenerator::today(cfg.sample_seed(), cfg.sample_days()),
    )
    .with_options(options))
}

/// Requested bounds, else the span of the table, else today
pub fn date_window(
    records: &[AirQualityRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let first = records.iter().map(AirQualityRecord::date).min();
    let last = records.iter().map(AirQualityRecord::date).max();
    (
        from.or(first).unwrap_or(today),
        to.or(last).unwrap_or(today),
    )
}

/// One line per location with its most recent non-forecast reading
pub fn summary_lines(records: &[AirQualityRecord]) -> Vec<String> {
    let now = Utc::now();
    let observed: Vec<AirQualityRecord> = records
        .iter()
        .filter(|r| r.timestamp <= now)
        .cloned()
        .collect();
    latest_by_location(&observed)
        .into_iter()
        .map(|r| {
            format!(
                "{} {}: AQI {} ({}) {}",
                r.weather_label.emoji(),
                r.location_name,
                r.aqi,
                r.aqi_category,
                r.timestamp.format("%Y-%m-%d %H:%M UTC")
            )
        })
        .collect()
}

fn print_outcome(outcome: &LoadOutcome) {
    println!("Data source: {}", outcome.provenance);
    for line in summary_lines(&outcome.records) {
        println!("{line}");
    }
    for skip in &outcome.skipped {
        println!("Skipped {}: {}", skip.location, skip.reason);
    }
}

pub async fn run(args: Args, cfg: AppConfig) -> Result<PathBuf> {
    let locations = select_locations(&args.locations, &cfg);
    let orchestrator = build_orchestrator(&cfg)?;
    let use_sample = args.sample || !orchestrator.has_provider();

    info!(locations = ?locations, use_sample, "Loading data");
    let outcome = orchestrator.load(&locations, use_sample).await;
    print_outcome(&outcome);

    let (start, end) = date_window(&outcome.records, args.from, args.to);
    let rows = filter_records(&outcome.records, &RecordFilter::between(start, end));

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_export_name(start, end)));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(file, &rows).context("Failed to write CSV")?;

    info!(path = %path.display(), rows = rows.len(), "Exported table");
    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}
