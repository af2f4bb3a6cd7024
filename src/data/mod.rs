//! Core data models for metcast
//!
//! This module contains the types produced by decoding a forecast payload:
//! the forecast location, single-hour observations and the sky/precipitation
//! attachment carried by a subset of them.

pub mod decoder;
pub mod metno;

pub use decoder::{decode, DecodeError, Decimals, RawAttribute, RawRecord};
pub use metno::{parse_payload, ForecastRequest};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point on the map to fetch forecasts for
///
/// Coordinates are rounded to 2 decimals on construction so that nearby
/// requests share the same upstream query and cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
    /// Height above sea level in meters, if known
    pub altitude: Option<i32>,
}

impl Location {
    /// Creates a location, rounding the coordinates to 2 decimals
    pub fn new(latitude: f64, longitude: f64, altitude: Option<i32>) -> Self {
        Self {
            latitude: round_to(latitude, 2),
            longitude: round_to(longitude, 2),
            altitude,
        }
    }
}

/// Sky condition symbol for a forecast period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkySymbol {
    /// Legacy numeric symbol code (0 when the name has no numeric code)
    pub number: u8,
    /// Symbol name, e.g. "partlycloudy"
    pub name: String,
}

/// Sky condition and precipitation for one hour
///
/// Only a subset of hours carry one natively. The aggregation pass copies the
/// nearest hour's attachment onto hours that lack one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyAttachment {
    /// Sky symbol of the shortest forecast period, if reported
    pub symbol: Option<SkySymbol>,
    /// Precipitation in mm over the shortest forecast period
    pub precipitation: f64,
    /// Precipitation in mm keyed by forecast period length in hours
    pub precipitation_by_period: BTreeMap<u32, f64>,
}

/// One decoded weather reading for a specific date and hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the reading
    pub date: NaiveDate,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Direction the wind blows from, in degrees
    pub wind_degrees: f64,
    /// Compass label of the wind direction, e.g. "NW"
    pub wind_orientation: Option<String>,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Air pressure at sea level
    pub pressure: f64,
    /// Unit of `pressure`, usually "hPa"
    pub pressure_unit: Option<String>,
    /// Fog area fraction percentage
    pub fog: f64,
    /// Total cloud area fraction percentage
    pub cloudiness: f64,
    /// Low cloud percentage
    pub low_clouds: f64,
    /// Medium cloud percentage
    pub medium_clouds: f64,
    /// High cloud percentage
    pub high_clouds: f64,
    /// Sky symbol and precipitation, if known for this hour
    pub sky: Option<SkyAttachment>,
}

impl Observation {
    /// Time of day formatted as "HH:00"
    pub fn time(&self) -> String {
        format!("{:02}:00", self.hour)
    }

    /// Sky symbol for this hour, if any
    pub fn symbol(&self) -> Option<&SkySymbol> {
        self.sky.as_ref().and_then(|sky| sky.symbol.as_ref())
    }

    /// Precipitation in mm for this hour, if any
    pub fn precipitation(&self) -> Option<f64> {
        self.sky.as_ref().map(|sky| sky.precipitation)
    }
}

/// Largest decimal count an f64 can meaningfully round to
pub const MAX_DECIMALS: u32 = 15;

/// Rounds half away from zero to the given number of decimals
///
/// Counts above `MAX_DECIMALS` round as `MAX_DECIMALS`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a bare observation for tests in this crate
    pub(crate) fn observation(date: &str, hour: u32, temperature: f64) -> Observation {
        Observation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            hour,
            temperature,
            wind_speed: 0.0,
            wind_degrees: 0.0,
            wind_orientation: None,
            humidity: 0.0,
            pressure: 0.0,
            pressure_unit: None,
            fog: 0.0,
            cloudiness: 0.0,
            low_clouds: 0.0,
            medium_clouds: 0.0,
            high_clouds: 0.0,
            sky: None,
        }
    }

    #[test]
    fn test_location_rounds_coordinates() {
        let location = Location::new(49.199205, 16.598866, Some(250));

        assert!((location.latitude - 49.2).abs() < 1e-9);
        assert!((location.longitude - 16.6).abs() < 1e-9);
        assert_eq!(location.altitude, Some(250));
    }

    #[test]
    fn test_location_rounds_negative_coordinates() {
        let location = Location::new(-33.8688, -123.1544, None);

        assert!((location.latitude - (-33.87)).abs() < 1e-9);
        assert!((location.longitude - (-123.15)).abs() < 1e-9);
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(12.0, 1), 12.0);
    }

    #[test]
    fn test_round_to_caps_decimal_count() {
        assert_eq!(round_to(1.25, 400), 1.25);
        assert_eq!(round_to(-7.5, u32::MAX), -7.5);
    }

    #[test]
    fn test_observation_time_is_zero_padded() {
        assert_eq!(observation("2024-06-01", 8, 20.0).time(), "08:00");
        assert_eq!(observation("2024-06-01", 20, 20.0).time(), "20:00");
    }

    #[test]
    fn test_observation_without_sky_has_no_symbol() {
        let obs = observation("2024-06-01", 8, 20.0);

        assert!(obs.symbol().is_none());
        assert!(obs.precipitation().is_none());
    }

    #[test]
    fn test_observation_sky_accessors() {
        let mut obs = observation("2024-06-01", 8, 20.0);
        obs.sky = Some(SkyAttachment {
            symbol: Some(SkySymbol {
                number: 3,
                name: "partlycloudy".to_string(),
            }),
            precipitation: 0.4,
            precipitation_by_period: BTreeMap::from([(1, 0.4), (6, 1.2)]),
        });

        assert_eq!(obs.symbol().map(|s| s.number), Some(3));
        assert_eq!(obs.precipitation(), Some(0.4));
    }
}
