//! Core data types, AQI math, and table rollups for the air quality dashboard
//!
//! This crate has no I/O. Live and synthetic data paths both produce the
//! [`AirQualityRecord`] defined here, so consumers never need to know where
//! a row came from.

pub mod aqi;
pub mod location;
pub mod pipeline;
pub mod rollups;
pub mod types;
pub mod units;
pub mod weather;

pub use aqi::*;
pub use location::*;
pub use pipeline::*;
pub use rollups::*;
pub use types::*;
pub use units::*;
pub use weather::*;
