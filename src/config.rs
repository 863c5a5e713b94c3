//! Tunable settings of a pipeline run.

use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_HISTORICAL_URL: &str = "https://historical-forecast-api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "CoordinatesForCities";

const DEFAULT_CITIES: [&str; 10] = [
    "Kyiv",
    "Tel Aviv-Yafo",
    "Lhasa",
    "Ulaanbaatar",
    "Reykjavík",
    "Johannesburg",
    "Dublin",
    "Bern",
    "Brasília",
    "Kingston",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Hourly fields requested from the historical source, renamed to the `year_start_*` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalFields {
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
}

impl Default for HistoricalFields {
    fn default() -> Self {
        Self {
            temperature: "temperature_2m".to_string(),
            humidity: "relative_humidity_2m".to_string(),
            wind_speed: "wind_speed_10m".to_string(),
        }
    }
}

impl HistoricalFields {
    pub fn names(&self) -> [&str; 3] {
        [
            self.temperature.as_str(),
            self.humidity.as_str(),
            self.wind_speed.as_str(),
        ]
    }
}

/// Settings for one pipeline run.
///
/// Construct it with [`PipelineConfig::builder()`], [`PipelineConfig::default()`] or load
/// it from a JSON file with [`PipelineConfig::from_json_file`]. Fields missing from the file
/// keep their defaults.
///
/// # Examples
///
/// ```
/// use weather_insights::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .cities(vec!["Reykjavík".to_string(), "Bern".to_string()])
///     .elevation_threshold(100.0)
///     .build();
/// assert_eq!(config.lookback_days, 8);
/// assert_eq!(config.cities.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct PipelineConfig {
    #[builder(default = DEFAULT_CITIES.iter().map(|c| c.to_string()).collect())]
    pub cities: Vec<String>,

    /// Days of hourly history before today.
    #[builder(default = 8)]
    pub lookback_days: u32,
    /// Days of hourly forecast starting today.
    #[builder(default = 8)]
    pub forecast_days: u32,

    /// Locations must lie strictly above this elevation (metres).
    #[builder(default = 50.0)]
    pub elevation_threshold: f64,
    /// Locations must have a lookback mean strictly below this temperature (°C).
    #[builder(default = 20.0)]
    pub average_temp_threshold: f64,

    #[builder(default = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default())]
    pub historical_date: NaiveDate,
    #[builder(default = 0)]
    pub historical_hour: u32,

    #[builder(into, default = "temperature_2m".to_string())]
    pub temperature_field: String,
    #[builder(default)]
    pub historical_fields: HistoricalFields,
    /// `auto` makes the source report each location in its own local time.
    #[builder(into, default = "auto".to_string())]
    pub timezone: String,

    #[builder(into, default = DEFAULT_FORECAST_URL.to_string())]
    pub forecast_url: String,
    #[builder(into, default = DEFAULT_HISTORICAL_URL.to_string())]
    pub historical_url: String,
    #[builder(into, default = DEFAULT_GEOCODING_URL.to_string())]
    pub geocoding_url: String,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,

    #[builder(into, default = "cities_data".to_string())]
    pub cities_table: String,
    #[builder(into, default = "weather_aggregated".to_string())]
    pub insights_table: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    /// Reads a JSON config file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: PipelineConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(ConfigError::Invalid("the city list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = self.cities.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ConfigError::Invalid(format!(
                "city '{duplicate}' is listed more than once"
            )));
        }
        if self.lookback_days == 0 || self.forecast_days == 0 {
            return Err(ConfigError::Invalid(
                "lookback_days and forecast_days must be at least 1".to_string(),
            ));
        }
        if self.historical_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "historical_hour {} is not an hour of the day",
                self.historical_hour
            )));
        }
        if self.temperature_field.is_empty()
            || self.historical_fields.names().iter().any(|f| f.is_empty())
        {
            return Err(ConfigError::Invalid(
                "hourly field names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The historical reference instant in the source's `YYYY-MM-DDTHH:MM` form.
    pub fn historical_timestamp(&self) -> String {
        format!(
            "{}T{:02}:00",
            self.historical_date.format("%Y-%m-%d"),
            self.historical_hour
        )
    }
}
