//! Column names shared by the frames that flow between the pipeline stages.

use crate::weather_data::error::SchemaError;
use polars::frame::DataFrame;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const ELEVATION: &str = "elevation";
pub const TIMEZONE_ABBREVIATION: &str = "timezone_abbreviation";
pub const TIMEZONE: &str = "timezone";
pub const TIME: &str = "time";

pub const AVG_TEMP_LAST_WEEK: &str = "avg_temp_last_week";
pub const AVG_TEMP_NEXT_WEEK: &str = "avg_temp_next_week";

pub const YEAR_START_TEMP: &str = "year_start_temp";
pub const YEAR_START_HUMIDITY: &str = "year_start_humidity";
pub const YEAR_START_WIND_SPEED: &str = "year_start_wind_speed";

/// Prefix the weather source nests its per-timestamp arrays under.
pub const HOURLY_PREFIX: &str = "hourly";

/// Columns of the `cities_data` output table.
pub const CITY_COLUMNS: [&str; 4] = [LATITUDE, LONGITUDE, ELEVATION, TIMEZONE];

/// Columns of the `weather_aggregated` output table.
pub const INSIGHT_COLUMNS: [&str; 7] = [
    LATITUDE,
    LONGITUDE,
    AVG_TEMP_LAST_WEEK,
    AVG_TEMP_NEXT_WEEK,
    YEAR_START_TEMP,
    YEAR_START_HUMIDITY,
    YEAR_START_WIND_SPEED,
];

/// Dotted path of an hourly array field in the source response.
pub fn hourly_path(field: &str) -> String {
    format!("{HOURLY_PREFIX}.{field}")
}

/// Fails with [`SchemaError::MissingColumn`] naming the first of `columns` absent from `frame`.
pub fn require_columns(frame: &DataFrame, columns: &[&str]) -> Result<(), SchemaError> {
    let present = frame.get_column_names();
    match columns
        .iter()
        .find(|c| !present.iter().any(|p| p.as_str() == **c))
    {
        Some(missing) => Err(SchemaError::MissingColumn {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}
