//! metcast library
//!
//! Point forecasts from MET Norway's Locationforecast API, decoded into
//! hourly observations and summarized per day with a representative day and
//! night reading. Payloads are cached on disk per clock hour.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod forecast;
pub mod report;
pub mod symbol;
pub mod transport;
