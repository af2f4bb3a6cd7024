//! Decoding of raw time-series records into observations
//!
//! A raw record is the payload-independent form of one forecast timestep: a
//! timestamp plus named attributes, each holding text fields. Keeping values as
//! text until decoding lets malformed numbers surface as `DecodeError`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{round_to, Observation, SkyAttachment, SkySymbol};

pub const TEMPERATURE: &str = "temperature";
pub const WIND_SPEED: &str = "wind_speed";
pub const WIND_DIRECTION: &str = "wind_direction";
pub const HUMIDITY: &str = "humidity";
pub const PRESSURE: &str = "pressure";
pub const CLOUDINESS: &str = "cloudiness";
pub const FOG: &str = "fog";
pub const LOW_CLOUDS: &str = "low_clouds";
pub const MEDIUM_CLOUDS: &str = "medium_clouds";
pub const HIGH_CLOUDS: &str = "high_clouds";
pub const SYMBOL: &str = "symbol";
pub const PRECIPITATION: &str = "precipitation";

/// Pressure is always reported with one decimal
const PRESSURE_DECIMALS: u32 = 1;

/// Errors that can occur when decoding a raw record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A numeric field held text that is not a number
    #[error("Invalid number in {attribute}.{field}: '{value}'")]
    InvalidNumber {
        attribute: String,
        field: String,
        value: String,
    },

    /// The record timestamp could not be parsed
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),
}

/// Decimal counts used when rounding decoded values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decimals {
    pub temperature: u32,
    pub wind_speed: u32,
    pub percent: u32,
}

impl Default for Decimals {
    fn default() -> Self {
        Self {
            temperature: 0,
            wind_speed: 2,
            percent: 0,
        }
    }
}

/// Text fields of one named attribute, e.g. `deg` and `name` of a wind direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttribute {
    fields: BTreeMap<String, String>,
}

impl RawAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any previous value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One timestep of a forecast payload before decoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub time: String,
    pub attributes: BTreeMap<String, RawAttribute>,
}

impl RawRecord {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute, replacing any previous one with the same name
    pub fn with(mut self, name: impl Into<String>, attribute: RawAttribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Reads a numeric field rounded to `decimals`, or 0 when absent
    fn number(&self, attribute: &str, field: &str, decimals: u32) -> Result<f64, DecodeError> {
        match self.attributes.get(attribute).and_then(|a| a.get(field)) {
            Some(text) => parse_number(attribute, field, text).map(|v| round_to(v, decimals)),
            None => Ok(0.0),
        }
    }

    fn text(&self, attribute: &str, field: &str) -> Option<String> {
        self.attributes
            .get(attribute)
            .and_then(|a| a.get(field))
            .map(str::to_string)
    }
}

fn invalid_number(attribute: &str, field: &str, text: &str) -> DecodeError {
    DecodeError::InvalidNumber {
        attribute: attribute.to_string(),
        field: field.to_string(),
        value: text.to_string(),
    }
}

/// Parses a finite number; "NaN" and "inf" are rejected
fn parse_number(attribute: &str, field: &str, text: &str) -> Result<f64, DecodeError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid_number(attribute, field, text)),
    }
}

/// Parse a timestamp keeping the wall-clock date and hour as written
///
/// Accepts RFC 3339 ("2024-06-01T14:00:00Z") and the shorter "2024-06-01T14:00".
fn parse_timestamp(time: &str) -> Result<NaiveDateTime, DecodeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(time) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .map_err(|_| DecodeError::InvalidTimestamp(time.to_string()))
}

/// Decodes one raw record into an observation
///
/// Missing numeric attributes decode as 0 and missing text attributes as
/// `None`; only malformed values fail.
pub fn decode(record: &RawRecord, decimals: &Decimals) -> Result<Observation, DecodeError> {
    let timestamp = parse_timestamp(&record.time)?;

    Ok(Observation {
        date: timestamp.date(),
        hour: timestamp.hour(),
        temperature: record.number(TEMPERATURE, "value", decimals.temperature)?,
        wind_speed: record.number(WIND_SPEED, "value", decimals.wind_speed)?,
        wind_degrees: record.number(WIND_DIRECTION, "deg", 0)?,
        wind_orientation: record.text(WIND_DIRECTION, "name"),
        humidity: record.number(HUMIDITY, "value", decimals.percent)?,
        pressure: record.number(PRESSURE, "value", PRESSURE_DECIMALS)?,
        pressure_unit: record.text(PRESSURE, "unit"),
        fog: record.number(FOG, "percent", decimals.percent)?,
        cloudiness: record.number(CLOUDINESS, "percent", decimals.percent)?,
        low_clouds: record.number(LOW_CLOUDS, "percent", decimals.percent)?,
        medium_clouds: record.number(MEDIUM_CLOUDS, "percent", decimals.percent)?,
        high_clouds: record.number(HIGH_CLOUDS, "percent", decimals.percent)?,
        sky: decode_sky(record)?,
    })
}

fn decode_sky(record: &RawRecord) -> Result<Option<SkyAttachment>, DecodeError> {
    let symbol = record.attributes.get(SYMBOL);
    let precipitation = record.attributes.get(PRECIPITATION);
    if symbol.is_none() && precipitation.is_none() {
        return Ok(None);
    }

    let symbol = match symbol {
        Some(attr) => {
            let number = match attr.get("number") {
                Some(text) => text
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| invalid_number(SYMBOL, "number", text))?,
                None => 0,
            };
            Some(SkySymbol {
                number,
                name: attr.get("id").unwrap_or_default().to_string(),
            })
        }
        None => None,
    };

    let mut precipitation_by_period = BTreeMap::new();
    if let Some(attr) = precipitation {
        // Period fields are keyed by their length in hours
        for (field, text) in attr.fields() {
            if let Ok(hours) = field.parse::<u32>() {
                precipitation_by_period.insert(hours, parse_number(PRECIPITATION, field, text)?);
            }
        }
    }

    Ok(Some(SkyAttachment {
        symbol,
        precipitation: record.number(PRECIPITATION, "value", 1)?,
        precipitation_by_period,
    }))
}
