use crate::config::PipelineConfig;
use crate::error::WeatherInsightsError;
use crate::types::columns::{
    hourly_path, ELEVATION, LATITUDE, LONGITUDE, TIME, TIMEZONE_ABBREVIATION,
};
use crate::types::lat_lon::{join_latitudes, join_longitudes, City};
use crate::weather_data::normalize::fetch_table;
use crate::weather_data::source::{QueryParams, WeatherSource};
use log::info;
use polars::frame::DataFrame;

/// Query for the hourly window around today, batching every city into one request.
pub fn forecast_params(config: &PipelineConfig, cities: &[City]) -> QueryParams {
    QueryParams::new()
        .with("latitude", join_latitudes(cities))
        .with("longitude", join_longitudes(cities))
        .with("past_days", config.lookback_days)
        .with("forecast_days", config.forecast_days)
        .with("hourly", &config.temperature_field)
        .with("timezone", &config.timezone)
}

/// Fetches the lookback and forecast window for `cities` as one exploded row per location
/// and hour, with columns `latitude, longitude, elevation, timezone_abbreviation,
/// <temperature_field>, time`.
pub async fn fetch_forecast_window(
    source: &dyn WeatherSource,
    config: &PipelineConfig,
    cities: &[City],
) -> Result<DataFrame, WeatherInsightsError> {
    let required_fields = vec![
        LATITUDE.to_string(),
        LONGITUDE.to_string(),
        ELEVATION.to_string(),
        TIMEZONE_ABBREVIATION.to_string(),
        hourly_path(&config.temperature_field),
        hourly_path(TIME),
    ];
    let array_fields = vec![TIME.to_string(), config.temperature_field.clone()];

    let frame = fetch_table(
        source,
        &config.forecast_url,
        &forecast_params(config, cities),
        &required_fields,
        &array_fields,
    )
    .await?;
    info!(
        "Fetched {} hourly rows for {} cities",
        frame.height(),
        cities.len()
    );
    Ok(frame)
}
