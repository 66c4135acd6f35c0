//! Air Quality Index calculation following EPA breakpoint conventions
//!
//! Each pollutant has a static piecewise-linear table mapping concentration
//! to a sub-index. The overall index is the worst (largest) sub-index.

use serde::{Deserialize, Serialize};

/// Smallest concentration fed into interpolation. Readings at or below zero
/// (and NaN) are raised to this value first.
pub const CONCENTRATION_FLOOR: f64 = 0.1;

/// Upper end of the AQI scale
pub const MAX_AQI: u16 = 500;

/// Ordered `(concentration, index)` pairs, increasing in both fields
pub type BreakpointTable = [(f64, f64); 8];

/// PM2.5 in µg/m³
pub const PM25_BREAKPOINTS: BreakpointTable = [
    (0.0, 0.0),
    (12.0, 50.0),
    (35.4, 100.0),
    (55.4, 150.0),
    (150.4, 200.0),
    (250.4, 300.0),
    (350.4, 400.0),
    (500.4, 500.0),
];

/// PM10 in µg/m³
pub const PM10_BREAKPOINTS: BreakpointTable = [
    (0.0, 0.0),
    (54.0, 50.0),
    (154.0, 100.0),
    (254.0, 150.0),
    (354.0, 200.0),
    (424.0, 300.0),
    (504.0, 400.0),
    (604.0, 500.0),
];

/// NO2 in ppb
pub const NO2_BREAKPOINTS: BreakpointTable = [
    (0.0, 0.0),
    (53.0, 50.0),
    (100.0, 100.0),
    (360.0, 150.0),
    (649.0, 200.0),
    (1249.0, 300.0),
    (1649.0, 400.0),
    (2049.0, 500.0),
];

/// O3 in ppb
pub const O3_BREAKPOINTS: BreakpointTable = [
    (0.0, 0.0),
    (54.0, 50.0),
    (70.0, 100.0),
    (85.0, 150.0),
    (105.0, 200.0),
    (200.0, 300.0),
    (300.0, 400.0),
    (500.0, 500.0),
];

/// Interpolate the sub-index for one concentration.
///
/// Returns 0 when the concentration lies outside the table. That makes
/// "off the scale" indistinguishable from "perfectly clean"; callers that
/// need to tell them apart must check the table bounds themselves.
pub fn sub_index(concentration: f64, table: &[(f64, f64)]) -> u16 {
    table
        .windows(2)
        .find_map(|pair| {
            let (c_lo, i_lo) = pair[0];
            let (c_hi, i_hi) = pair[1];
            if (c_lo..=c_hi).contains(&concentration) {
                let index = (i_hi - i_lo) * (concentration - c_lo) / (c_hi - c_lo) + i_lo;
                Some(index as u16)
            } else {
                None
            }
        })
        .unwrap_or(0)
}

/// Overall AQI for a set of concentrations (pm in µg/m³, gases in ppb)
pub fn compute_aqi(pm25: f64, pm10: f64, no2: f64, o3: f64) -> u16 {
    let floor = |c: f64| c.max(CONCENTRATION_FLOOR);

    [
        sub_index(floor(pm25), &PM25_BREAKPOINTS),
        sub_index(floor(pm10), &PM10_BREAKPOINTS),
        sub_index(floor(no2), &NO2_BREAKPOINTS),
        sub_index(floor(o3), &O3_BREAKPOINTS),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Map the provider's native 1-5 index onto the standard scale.
/// Anything outside 1-5 maps to 0.
pub fn aqi_from_provider_index(index: u8) -> u16 {
    match index {
        1 => 50,
        2 => 100,
        3 => 150,
        4 => 200,
        5 => 300,
        _ => 0,
    }
}

/// Health category band for an AQI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl AqiCategory {
    /// Band containing `aqi`. Negative values fall into Good.
    pub fn from_aqi(aqi: i32) -> Self {
        match aqi {
            i32::MIN..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Display color as a `#RRGGBB` hex string
    pub fn color(self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E400",
            AqiCategory::Moderate => "#FFFF00",
            AqiCategory::UnhealthyForSensitiveGroups => "#FF7E00",
            AqiCategory::Unhealthy => "#FF0000",
            AqiCategory::VeryUnhealthy => "#8F3F97",
            AqiCategory::Hazardous => "#7E0023",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `(label, color)` for an AQI value
pub fn categorize_aqi(aqi: i32) -> (&'static str, &'static str) {
    let category = AqiCategory::from_aqi(aqi);
    (category.label(), category.color())
}
