//! Unit conversion for pollutant concentrations
//!
//! The provider reports every pollutant in µg/m³. Gases are shown in ppb,
//! converted with fixed molar factors that hold near 25 °C and 1 atm; away
//! from those conditions the converted values are approximate.

/// Pollutants tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    O3,
}

impl Pollutant {
    /// Unit a converted value is expressed in
    pub fn reporting_unit(self) -> &'static str {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => "µg/m³",
            Pollutant::No2 | Pollutant::O3 => "ppb",
        }
    }

    /// Divisor taking µg/m³ to the reporting unit
    pub fn conversion_factor(self) -> f64 {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => 1.0,
            Pollutant::No2 => 1.88,
            Pollutant::O3 => 2.0,
        }
    }
}

/// Convert a µg/m³ concentration to the pollutant's reporting unit
pub fn to_reporting_unit(micrograms_per_m3: f64, pollutant: Pollutant) -> f64 {
    micrograms_per_m3 / pollutant.conversion_factor()
}
