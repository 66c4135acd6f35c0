//! Geographic coordinates and the preset location table

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Latitude out of range: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range: {0}")]
    LongitudeOutOfRange(f64),

    #[error("(0, 0) is a null result, not a location")]
    NullIsland,
}

/// A validated latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate a pair. NaN fails the range checks.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        if latitude == 0.0 && longitude == 0.0 {
            return Err(CoordinateError::NullIsland);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Well-known cities resolved without a geocoding round-trip
pub const PRESET_LOCATIONS: [(&str, f64, f64); 8] = [
    ("New York, US", 40.7128, -74.0060),
    ("Los Angeles, US", 34.0522, -118.2437),
    ("London, UK", 51.5074, -0.1278),
    ("Tokyo, Japan", 35.6762, 139.6503),
    ("Sydney, Australia", -33.8688, 151.2093),
    ("Cape Town, South Africa", -33.9249, 18.4241),
    ("Rio de Janeiro, Brazil", -22.9068, -43.1729),
    ("Mumbai, India", 19.0760, 72.8777),
];

/// Exact-name lookup in [`PRESET_LOCATIONS`]
pub fn preset_coordinates(name: &str) -> Option<Coordinates> {
    PRESET_LOCATIONS
        .iter()
        .find(|(preset, _, _)| *preset == name)
        .map(|&(_, latitude, longitude)| Coordinates {
            latitude,
            longitude,
        })
}

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESET_LOCATIONS.iter().map(|(name, _, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let c = Coordinates::new(51.5074, -0.1278).unwrap();
        assert_eq!(c.latitude(), 51.5074);
        assert_eq!(c.longitude(), -0.1278);
        // A single zero axis is fine
        assert!(Coordinates::new(0.0, 32.5).is_ok());
    }

    #[test]
    fn test_null_island_rejected() {
        assert_eq!(Coordinates::new(0.0, 0.0), Err(CoordinateError::NullIsland));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            Coordinates::new(10.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(_))
        ));
        assert!(Coordinates::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_presets() {
        let tokyo = preset_coordinates("Tokyo, Japan").unwrap();
        assert_eq!(tokyo.latitude(), 35.6762);
        assert!(preset_coordinates("tokyo").is_none());
        assert_eq!(preset_names().count(), 8);
        for (_, lat, lon) in PRESET_LOCATIONS {
            assert!(Coordinates::new(lat, lon).is_ok());
        }
    }
}
