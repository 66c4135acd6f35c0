//! Seeded synthetic data used when no live provider is available

use std::f64::consts::PI;

use airq_core::{
    preset_coordinates, AirQualityRecord, PollutantReading, WeatherConditions, WeatherLabel,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, Normal};
use tracing::debug;

use crate::{AcquireError, AcquireResult};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_DAYS: u32 = 7;

/// Lower bound for every generated physical quantity
pub const QUANTITY_FLOOR: f64 = 0.1;

/// Distributions drawn from for each synthetic row
struct Distributions {
    temperature_noise: Normal<f64>,
    pm25: Gamma<f64>,
    no2: Gamma<f64>,
    o3: Gamma<f64>,
    humidity: Normal<f64>,
    wind: Gamma<f64>,
}

impl Distributions {
    fn build() -> AcquireResult<Self> {
        let gamma = |shape: f64, scale: f64| {
            Gamma::new(shape, scale).map_err(|e| AcquireError::SampleGeneration(e.to_string()))
        };
        let normal = |mean: f64, std_dev: f64| {
            Normal::new(mean, std_dev).map_err(|e| AcquireError::SampleGeneration(e.to_string()))
        };
        Ok(Self {
            temperature_noise: normal(0.0, 5.0)?,
            pm25: gamma(2.0, 5.0)?,
            no2: gamma(3.0, 4.0)?,
            o3: gamma(4.0, 5.0)?,
            humidity: normal(60.0, 15.0)?,
            wind: gamma(2.0, 2.5)?,
        })
    }
}

/// Seasonal baseline: coolest around December, warmest around June
fn seasonal_base_temp(month: u32) -> f64 {
    15.0 + 10.0 * ((f64::from(month) - 3.0) * PI / 6.0).sin()
}

/// Deterministic generator of daily records.
///
/// Output is a pure function of the seed, end date, day count, and location
/// list. Rows are ordered by date, then by location in input order.
#[derive(Debug, Clone)]
pub struct SampleDataGenerator {
    seed: u64,
    days: u32,
    end_date: NaiveDate,
}

impl SampleDataGenerator {
    pub fn new(seed: u64, days: u32, end_date: NaiveDate) -> Self {
        Self {
            seed,
            days,
            end_date,
        }
    }

    /// Generator whose window ends on today's UTC date
    pub fn today(seed: u64, days: u32) -> Self {
        Self::new(seed, days, Utc::now().date_naive())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Calendar days covered, oldest first
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.days)
            .rev()
            .map(|back| self.end_date - Duration::days(i64::from(back)))
            .collect()
    }

    pub fn generate(&self, locations: &[String]) -> AcquireResult<Vec<AirQualityRecord>> {
        let dist = Distributions::build()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(self.days as usize * locations.len());

        for date in self.dates() {
            let timestamp = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
            let base_temp = seasonal_base_temp(date.month());

            for name in locations {
                let (latitude, longitude) = preset_coordinates(name)
                    .map(|c| (c.latitude(), c.longitude()))
                    .unwrap_or((0.0, 0.0));

                let temp = base_temp + dist.temperature_noise.sample(&mut rng);

                let pm25 = dist.pm25.sample(&mut rng) * if temp > 25.0 { 1.1 } else { 1.0 };
                let pm10 = pm25 * (1.5 + rng.gen::<f64>() * 1.5);
                let no2 = dist.no2.sample(&mut rng)
                    * if temp < 10.0 || temp > 30.0 { 1.2 } else { 1.0 };
                let o3 = dist.o3.sample(&mut rng) * if temp > 25.0 { 1.3 } else { 1.0 };

                let reading = PollutantReading {
                    pm25,
                    pm10,
                    no2,
                    o3,
                }
                .clamped(QUANTITY_FLOOR);

                let weather = WeatherConditions {
                    temperature_c: temp,
                    humidity_pct: dist.humidity.sample(&mut rng).clamp(QUANTITY_FLOOR, 100.0),
                    wind_speed: dist.wind.sample(&mut rng).max(QUANTITY_FLOOR),
                    label: WeatherLabel::from_temperature(temp),
                };

                records.push(AirQualityRecord::new(
                    timestamp,
                    name.as_str(),
                    (latitude, longitude),
                    reading,
                    weather,
                    reading.aqi(),
                ));
            }
        }

        debug!(
            seed = self.seed,
            days = self.days,
            locations = locations.len(),
            rows = records.len(),
            "Generated sample data"
        );
        Ok(records)
    }
}
