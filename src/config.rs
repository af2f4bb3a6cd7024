//! Forecast configuration
//!
//! All settings have defaults; a TOML file may override any subset. The
//! configuration is an immutable value handed to each session, so several
//! sessions can share one.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::metno::{DEFAULT_USER_AGENT, METNO_COMPACT_URL};
use crate::data::{Decimals, Observation, MAX_DECIMALS};

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An hour setting is outside 0-23
    #[error("Invalid hour for {field}: {value} (expected 0-23)")]
    InvalidHour { field: &'static str, value: u32 },

    /// A decimal count is too large to round with
    #[error("Invalid decimal count for {field}: {value} (expected 0-15)")]
    InvalidDecimals { field: &'static str, value: u32 },
}

/// How the representative day observation is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySelection {
    /// Warmest daytime hour
    HighestTemperature,
    /// The configured `day_hour`, or the nearest hour to it
    FixedHour,
}

/// How the representative night observation is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightSelection {
    /// Coldest hour from `night_starts_hour` on
    LowestTemperature,
    /// The configured `night_hour`, or the nearest hour to it
    FixedHour,
}

/// Day/night representative selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub day: DaySelection,
    pub night: NightSelection,
    /// Target hour for `DaySelection::FixedHour`
    pub day_hour: u32,
    /// Target hour for `NightSelection::FixedHour`; hours at or past it count as night
    pub night_hour: u32,
    /// First hour eligible for `NightSelection::LowestTemperature`
    pub night_starts_hour: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            day: DaySelection::HighestTemperature,
            night: NightSelection::LowestTemperature,
            day_hour: 14,
            night_hour: 23,
            night_starts_hour: 20,
        }
    }
}

impl SelectionConfig {
    /// Selects the day observation at a fixed hour
    pub fn with_day_hour(mut self, hour: u32) -> Result<Self, ConfigError> {
        self.day_hour = check_hour("day_hour", hour)?;
        self.day = DaySelection::FixedHour;
        Ok(self)
    }

    /// Selects the night observation at a fixed hour
    pub fn with_night_hour(mut self, hour: u32) -> Result<Self, ConfigError> {
        self.night_hour = check_hour("night_hour", hour)?;
        self.night = NightSelection::FixedHour;
        Ok(self)
    }

    /// Sets the hour the night starts for lowest-temperature selection
    pub fn with_night_starts_hour(mut self, hour: u32) -> Result<Self, ConfigError> {
        self.night_starts_hour = check_hour("night_starts_hour", hour)?;
        Ok(self)
    }

    /// Whether an observation falls in the night
    pub fn is_night(&self, observation: &Observation) -> bool {
        observation.hour >= self.night_hour
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_hour("day_hour", self.day_hour)?;
        check_hour("night_hour", self.night_hour)?;
        check_hour("night_starts_hour", self.night_starts_hour)?;
        Ok(())
    }
}

fn check_decimals(decimals: &Decimals) -> Result<(), ConfigError> {
    let counts = [
        ("temperature", decimals.temperature),
        ("wind_speed", decimals.wind_speed),
        ("percent", decimals.percent),
    ];
    match counts.into_iter().find(|(_, value)| *value > MAX_DECIMALS) {
        Some((field, value)) => Err(ConfigError::InvalidDecimals { field, value }),
        None => Ok(()),
    }
}

fn check_hour(field: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value <= 23 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidHour { field, value })
    }
}

/// Complete configuration for forecast sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Locationforecast endpoint, without query string
    pub api_url: String,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Cache directory; the XDG cache directory when unset
    pub cache_dir: Option<PathBuf>,
    pub decimals: Decimals,
    pub selection: SelectionConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            api_url: METNO_COMPACT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_dir: None,
            decimals: Decimals::default(),
            selection: SelectionConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Loads and validates a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses and validates TOML config text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ForecastConfig = toml::from_str(content)?;
        config.selection.validate()?;
        check_decimals(&config.decimals)?;
        Ok(config)
    }

    /// Resolves the cache directory
    ///
    /// Uses `cache_dir` when set, otherwise `~/.cache/metcast/` on Linux or the
    /// platform equivalent. Returns `None` if no home directory is known.
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Some(dir.clone());
        }
        let project_dirs = ProjectDirs::from("", "", "metcast")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }
}
