//! Forecast aggregation and the per-location session
//!
//! Turns decoded observations into per-day aggregates with a representative
//! day and night observation, and drives one location's fetch lifecycle.

pub mod aggregate;
pub mod resolver;
pub mod session;

pub use aggregate::{aggregate, AggregateStore, DayAggregate};
pub use resolver::{nearest_hour, Nearest};
pub use session::{Clock, FixedClock, ForecastSession, SessionStatus, SystemClock};

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::DecodeError;
use crate::transport::TransportError;

/// Errors that can occur when retrieving or querying a forecast
///
/// Cloneable so that a failed session can hand its stored error back on
/// every query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Downloading the payload failed
    #[error("Failed to download forecast: {0}")]
    Transport(#[from] TransportError),

    /// The payload is not a valid forecast document
    #[error("Failed to parse forecast payload: {0}")]
    PayloadParse(String),

    /// A record in the payload holds malformed values
    #[error("Failed to decode forecast: {0}")]
    Decode(#[from] DecodeError),

    /// No aggregate exists for the requested date
    #[error("Forecast for date {0} doesn't exist")]
    EmptyData(NaiveDate),
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        ForecastError::PayloadParse(e.to_string())
    }
}
