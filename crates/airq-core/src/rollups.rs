//! Filtering and aggregation over the record table

use crate::types::AirQualityRecord;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Aggregation type for rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateType {
    Avg,
    Max,
    Count,
}

/// Accumulator for calculating aggregates over multiple observations
#[derive(Debug, Clone)]
pub struct Accumulator {
    observations: Vec<f64>,
    aggregate_type: AggregateType,
}

impl Accumulator {
    pub fn new(aggregate_type: AggregateType) -> Self {
        Self {
            observations: Vec::new(),
            aggregate_type,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.observations.push(value);
    }

    pub fn result(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }

        Some(match self.aggregate_type {
            AggregateType::Max => self
                .observations
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
            AggregateType::Avg => {
                let sum: f64 = self.observations.iter().sum();
                sum / self.observations.len() as f64
            }
            AggregateType::Count => self.observations.len() as f64,
        })
    }

    pub fn count(&self) -> usize {
        self.observations.len()
    }
}

/// Row selection applied by the presentation layer before display or export
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// First calendar day kept (inclusive)
    pub start: Option<NaiveDate>,
    /// Last calendar day kept (inclusive)
    pub end: Option<NaiveDate>,
    /// Keep only these locations; `None` keeps all
    pub locations: Option<Vec<String>>,
}

impl RecordFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            locations: None,
        }
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    pub fn matches(&self, record: &AirQualityRecord) -> bool {
        let date = record.date();
        self.start.map_or(true, |start| date >= start)
            && self.end.map_or(true, |end| date <= end)
            && self
                .locations
                .as_ref()
                .map_or(true, |names| names.iter().any(|n| *n == record.location_name))
    }
}

pub fn filter_records(records: &[AirQualityRecord], filter: &RecordFilter) -> Vec<AirQualityRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Per-day, per-location means
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub location_name: String,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed: f64,
    pub mean_aqi: f64,
    pub peak_aqi: u16,
    pub samples: usize,
}

struct DailyAccumulators {
    pm25: Accumulator,
    pm10: Accumulator,
    no2: Accumulator,
    o3: Accumulator,
    temperature_c: Accumulator,
    humidity_pct: Accumulator,
    wind_speed: Accumulator,
    aqi: Accumulator,
    peak_aqi: Accumulator,
    samples: Accumulator,
}

impl DailyAccumulators {
    fn new() -> Self {
        let avg = || Accumulator::new(AggregateType::Avg);
        Self {
            pm25: avg(),
            pm10: avg(),
            no2: avg(),
            o3: avg(),
            temperature_c: avg(),
            humidity_pct: avg(),
            wind_speed: avg(),
            aqi: avg(),
            peak_aqi: Accumulator::new(AggregateType::Max),
            samples: Accumulator::new(AggregateType::Count),
        }
    }

    fn add(&mut self, record: &AirQualityRecord) {
        self.pm25.add(record.pm25);
        self.pm10.add(record.pm10);
        self.no2.add(record.no2);
        self.o3.add(record.o3);
        self.temperature_c.add(record.temperature_c);
        self.humidity_pct.add(record.humidity_pct);
        self.wind_speed.add(record.wind_speed);
        self.aqi.add(f64::from(record.aqi));
        self.peak_aqi.add(f64::from(record.aqi));
        self.samples.add(1.0);
    }

    fn summarize(&self, date: NaiveDate, location_name: String) -> DailySummary {
        let value = |acc: &Accumulator| acc.result().unwrap_or(f64::NAN);
        DailySummary {
            date,
            location_name,
            pm25: value(&self.pm25),
            pm10: value(&self.pm10),
            no2: value(&self.no2),
            o3: value(&self.o3),
            temperature_c: value(&self.temperature_c),
            humidity_pct: value(&self.humidity_pct),
            wind_speed: value(&self.wind_speed),
            mean_aqi: value(&self.aqi),
            peak_aqi: self.peak_aqi.result().unwrap_or(0.0) as u16,
            samples: self.samples.result().unwrap_or(0.0) as usize,
        }
    }
}

/// Group records by (UTC date, location) and average each quantity.
/// Output is ordered by date, then location name.
pub fn daily_averages(records: &[AirQualityRecord]) -> Vec<DailySummary> {
    let mut groups: BTreeMap<(NaiveDate, &str), DailyAccumulators> = BTreeMap::new();

    for record in records {
        groups
            .entry((record.date(), record.location_name.as_str()))
            .or_insert_with(DailyAccumulators::new)
            .add(record);
    }

    groups
        .into_iter()
        .map(|((date, location), acc)| acc.summarize(date, location.to_string()))
        .collect()
}

/// Most recent record per location, in first-seen location order
pub fn latest_by_location(records: &[AirQualityRecord]) -> Vec<&AirQualityRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &AirQualityRecord> = HashMap::new();

    for record in records {
        let name = record.location_name.as_str();
        match latest.get(name) {
            Some(current) if current.timestamp >= record.timestamp => {}
            Some(_) => {
                latest.insert(name, record);
            }
            None => {
                order.push(name);
                latest.insert(name, record);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| latest.get(name).copied())
        .collect()
}
