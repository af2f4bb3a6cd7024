//! Command-line interface parsing for metcast
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into validated run options for the binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use crate::data::Location;

/// Error types for CLI argument validation
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    /// A coordinate is outside its valid range
    #[error("Invalid {name}: {value} (expected {min} to {max})")]
    InvalidCoordinate {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The number of days to show is zero
    #[error("Invalid day count: {0} (expected at least 1)")]
    InvalidDays(usize),
}

/// metcast - MET Norway point forecasts summarized per day
#[derive(Parser, Debug)]
#[command(name = "metcast")]
#[command(about = "Daily day/night forecast summaries from MET Norway")]
#[command(version)]
pub struct Cli {
    /// Latitude in degrees, rounded to 2 decimals
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees, rounded to 2 decimals
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Height above sea level in meters
    #[arg(long, allow_negative_numbers = true)]
    pub altitude: Option<i32>,

    /// Number of days to show
    #[arg(long, default_value_t = 5)]
    pub days: usize,

    /// Show a single date (YYYY-MM-DD) instead of the first days
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache directory, overriding the configuration
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Always fetch, never read or write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print the aggregates as JSON
    #[arg(long, conflicts_with = "raw")]
    pub json: bool,

    /// Print the raw upstream payload
    #[arg(long)]
    pub raw: bool,

    /// Render symbols as local icon file names with this extension
    ///
    /// Examples:
    ///   metcast --lat 59.91 --lon 10.75 --icon-ext svg   # 3-partlycloudy.svg
    ///   metcast --lat 59.91 --lon 10.75 --icon-ext ""    # 3-partlycloudy
    ///
    /// Without it, MET Norway icon URLs are printed.
    #[arg(long, value_name = "EXT")]
    pub icon_ext: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the binary prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Raw,
}

/// Which days to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelector {
    /// The first `n` days of the forecast
    First(usize),
    /// One exact date
    Date(NaiveDate),
}

/// Validated options derived from CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub location: Location,
    pub days: DaySelector,
    pub config_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
    pub output: OutputFormat,
    pub icon_ext: Option<String>,
    pub verbose: bool,
}

impl RunOptions {
    /// Creates RunOptions from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunOptions)` with the location rounded and output chosen
    /// * `Err(CliError)` if a coordinate or the day count is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        check_coordinate("latitude", cli.lat, 90.0)?;
        check_coordinate("longitude", cli.lon, 180.0)?;

        let days = match cli.date {
            Some(date) => DaySelector::Date(date),
            None if cli.days == 0 => return Err(CliError::InvalidDays(cli.days)),
            None => DaySelector::First(cli.days),
        };

        let output = if cli.raw {
            OutputFormat::Raw
        } else if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Ok(RunOptions {
            location: Location::new(cli.lat, cli.lon, cli.altitude),
            days,
            config_path: cli.config.clone(),
            cache_dir: cli.cache_dir.clone(),
            use_cache: !cli.no_cache,
            output,
            icon_ext: cli.icon_ext.clone(),
            verbose: cli.verbose,
        })
    }
}

fn check_coordinate(name: &'static str, value: f64, limit: f64) -> Result<(), CliError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(CliError::InvalidCoordinate {
            name,
            value,
            min: -limit,
            max: limit,
        })
    }
}
