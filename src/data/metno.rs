//! MET Norway Locationforecast 2.0 request and payload handling
//!
//! Builds the request for a location and flattens the JSON response into raw
//! records for the decoder. The HTTP call itself lives in `crate::transport`.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::decoder::{
    RawAttribute, RawRecord, CLOUDINESS, FOG, HIGH_CLOUDS, HUMIDITY, LOW_CLOUDS, MEDIUM_CLOUDS,
    PRECIPITATION, PRESSURE, SYMBOL, TEMPERATURE, WIND_DIRECTION, WIND_SPEED,
};
use super::Location;

/// Base URL for the compact Locationforecast product
pub const METNO_COMPACT_URL: &str = "https://api.met.no/weatherapi/locationforecast/2.0/compact";

/// Identifies this client to MET Norway, as their terms of service require
pub const DEFAULT_USER_AGENT: &str = concat!("metcast/", env!("CARGO_PKG_VERSION"));

/// Request parameters for one location, derived once
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    base_url: String,
    user_agent: String,
    query: String,
}

impl ForecastRequest {
    /// Creates a request against the default compact endpoint
    pub fn new(location: &Location) -> Self {
        Self::with_base_url(location, METNO_COMPACT_URL)
    }

    /// Creates a request against a custom endpoint (e.g. the complete product)
    pub fn with_base_url(location: &Location, base_url: impl Into<String>) -> Self {
        let mut query = format!("lat={}&lon={}", location.latitude, location.longitude);
        if let Some(altitude) = location.altitude {
            query.push_str(&format!("&altitude={}", altitude));
        }

        Self {
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            query,
        }
    }

    /// Overrides the User-Agent header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Query string, e.g. "lat=49.2&lon=16.6&altitude=250"
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn url(&self) -> String {
        format!("{}?{}", self.base_url, self.query)
    }

    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Accept", "application/json".to_string()),
            ("User-Agent", self.user_agent.clone()),
        ]
    }
}

/// Locationforecast response structure
#[derive(Debug, Deserialize)]
struct MetnoResponse {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    meta: Option<Meta>,
    timeseries: Vec<TimeStep>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    units: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TimeStep {
    time: String,
    data: TimeStepData,
}

#[derive(Debug, Deserialize)]
struct TimeStepData {
    instant: Instant,
    next_1_hours: Option<Period>,
    next_6_hours: Option<Period>,
    next_12_hours: Option<Period>,
}

#[derive(Debug, Deserialize)]
struct Instant {
    #[serde(default)]
    details: InstantDetails,
}

/// Instant values; only a subset is present in the compact product
#[derive(Debug, Default, Deserialize)]
struct InstantDetails {
    air_temperature: Option<f64>,
    wind_speed: Option<f64>,
    wind_from_direction: Option<f64>,
    relative_humidity: Option<f64>,
    air_pressure_at_sea_level: Option<f64>,
    cloud_area_fraction: Option<f64>,
    cloud_area_fraction_low: Option<f64>,
    cloud_area_fraction_medium: Option<f64>,
    cloud_area_fraction_high: Option<f64>,
    fog_area_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Period {
    summary: Option<Summary>,
    details: Option<PeriodDetails>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    symbol_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PeriodDetails {
    precipitation_amount: Option<f64>,
}

/// Parse a Locationforecast JSON body into raw records, one per timestep
pub fn parse_payload(payload: &[u8]) -> Result<Vec<RawRecord>, serde_json::Error> {
    let response: MetnoResponse = serde_json::from_slice(payload)?;
    let pressure_unit = response
        .properties
        .meta
        .as_ref()
        .and_then(|meta| meta.units.get("air_pressure_at_sea_level"))
        .cloned();

    Ok(response
        .properties
        .timeseries
        .into_iter()
        .map(|step| to_raw_record(step, pressure_unit.as_deref()))
        .collect())
}

fn to_raw_record(step: TimeStep, pressure_unit: Option<&str>) -> RawRecord {
    let details = &step.data.instant.details;
    let mut record = RawRecord::new(step.time.clone());

    let values = [
        (TEMPERATURE, "value", details.air_temperature),
        (WIND_SPEED, "value", details.wind_speed),
        (HUMIDITY, "value", details.relative_humidity),
        (CLOUDINESS, "percent", details.cloud_area_fraction),
        (FOG, "percent", details.fog_area_fraction),
        (LOW_CLOUDS, "percent", details.cloud_area_fraction_low),
        (MEDIUM_CLOUDS, "percent", details.cloud_area_fraction_medium),
        (HIGH_CLOUDS, "percent", details.cloud_area_fraction_high),
    ];
    for (name, field, value) in values {
        if let Some(value) = value {
            record = record.with(name, RawAttribute::new().with(field, value.to_string()));
        }
    }

    if let Some(degrees) = details.wind_from_direction {
        record = record.with(
            WIND_DIRECTION,
            RawAttribute::new()
                .with("deg", degrees.to_string())
                .with("name", compass_label(degrees)),
        );
    }

    if let Some(pressure) = details.air_pressure_at_sea_level {
        let mut attribute = RawAttribute::new().with("value", pressure.to_string());
        if let Some(unit) = pressure_unit {
            attribute = attribute.with("unit", unit);
        }
        record = record.with(PRESSURE, attribute);
    }

    let periods = [
        (1u32, step.data.next_1_hours.as_ref()),
        (6, step.data.next_6_hours.as_ref()),
        (12, step.data.next_12_hours.as_ref()),
    ];

    // The shortest reported period supplies the symbol and primary amount
    let mut precipitation = RawAttribute::new();
    let mut has_precipitation = false;
    let mut symbol_taken = false;
    for (hours, period) in periods {
        let Some(period) = period else { continue };

        if !symbol_taken {
            if let Some(code) = period.summary.as_ref().and_then(|s| s.symbol_code.as_deref()) {
                record = record.with(SYMBOL, symbol_attribute(code));
                symbol_taken = true;
            }
        }

        if let Some(amount) = period.details.as_ref().and_then(|d| d.precipitation_amount) {
            if !has_precipitation {
                precipitation = precipitation.with("value", amount.to_string());
                has_precipitation = true;
            }
            precipitation = precipitation.with(hours.to_string(), amount.to_string());
        }
    }
    if has_precipitation {
        record = record.with(PRECIPITATION, precipitation);
    }

    record
}

fn symbol_attribute(code: &str) -> RawAttribute {
    let name = strip_variant(code);
    let attribute = RawAttribute::new().with("id", name);
    match legacy_symbol_number(name) {
        Some(number) => attribute.with("number", number.to_string()),
        None => attribute,
    }
}

/// Strip the "_day"/"_night"/"_polartwilight" variant from a symbol code
fn strip_variant(code: &str) -> &str {
    ["_day", "_night", "_polartwilight"]
        .iter()
        .find_map(|suffix| code.strip_suffix(suffix))
        .unwrap_or(code)
}

/// Map a symbol name to the legacy numeric weather icon code
///
/// See: https://api.met.no/weatherapi/weathericon/2.0/documentation
pub fn legacy_symbol_number(name: &str) -> Option<u8> {
    let number = match name {
        "clearsky" => 1,
        "fair" => 2,
        "partlycloudy" => 3,
        "cloudy" => 4,
        "rainshowers" => 5,
        "rainshowersandthunder" => 6,
        "sleetshowers" => 7,
        "snowshowers" => 8,
        "rain" => 9,
        "heavyrain" => 10,
        "heavyrainandthunder" => 11,
        "sleet" => 12,
        "snow" => 13,
        "snowandthunder" => 14,
        "fog" => 15,
        "sleetshowersandthunder" => 20,
        "snowshowersandthunder" => 21,
        "rainandthunder" => 22,
        "sleetandthunder" => 23,
        "lightrainshowersandthunder" => 24,
        "heavyrainshowersandthunder" => 25,
        "lightssleetshowersandthunder" => 26,
        "heavysleetshowersandthunder" => 27,
        "lightssnowshowersandthunder" => 28,
        "heavysnowshowersandthunder" => 29,
        "lightrainandthunder" => 30,
        "lightsleetandthunder" => 31,
        "heavysleetandthunder" => 32,
        "lightsnowandthunder" => 33,
        "heavysnowandthunder" => 34,
        "lightrainshowers" => 40,
        "heavyrainshowers" => 41,
        "lightsleetshowers" => 42,
        "heavysleetshowers" => 43,
        "lightsnowshowers" => 44,
        "heavysnowshowers" => 45,
        "lightrain" => 46,
        "lightsleet" => 47,
        "heavysleet" => 48,
        "lightsnow" => 49,
        "heavysnow" => 50,
        _ => return None,
    };
    Some(number)
}

/// 16-point compass label for a direction in degrees
pub fn compass_label(degrees: f64) -> &'static str {
    const LABELS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % LABELS.len();
    LABELS[index]
}
