//! Joins a single-instant historical reading onto the aggregated locations.

use crate::config::PipelineConfig;
use crate::error::WeatherInsightsError;
use crate::types::columns::{
    hourly_path, ELEVATION, LATITUDE, LONGITUDE, YEAR_START_HUMIDITY, YEAR_START_TEMP,
    YEAR_START_WIND_SPEED,
};
use crate::weather_data::error::SchemaError;
use crate::weather_data::normalize::fetch_table;
use crate::weather_data::source::{QueryParams, WeatherSource};
use log::{info, warn};
use polars::prelude::*;

/// Query for the historical snapshot of the locations in `aggregated`, pinned to the
/// configured date and hour.
pub fn historical_params(
    config: &PipelineConfig,
    aggregated: &DataFrame,
) -> Result<QueryParams, SchemaError> {
    let timestamp = config.historical_timestamp();
    let date = config.historical_date.format("%Y-%m-%d").to_string();
    Ok(QueryParams::new()
        .with("latitude", joined_column(aggregated, LATITUDE)?)
        .with("longitude", joined_column(aggregated, LONGITUDE)?)
        .with("start_date", &date)
        .with("end_date", &date)
        .with("start_hour", &timestamp)
        .with("end_hour", &timestamp)
        .with("hourly", config.historical_fields.names().join(",")))
}

/// Fetches the historical snapshot and inner-joins it onto `aggregated` by
/// `(latitude, longitude)`, adding `year_start_temp`, `year_start_humidity` and
/// `year_start_wind_speed`.
///
/// Locations the source returns no reading for are dropped.
pub async fn append_historical(
    source: &dyn WeatherSource,
    config: &PipelineConfig,
    aggregated: DataFrame,
) -> Result<DataFrame, WeatherInsightsError> {
    let fields = &config.historical_fields;
    let required_fields = vec![
        LATITUDE.to_string(),
        LONGITUDE.to_string(),
        ELEVATION.to_string(),
        hourly_path(&fields.temperature),
        hourly_path(&fields.humidity),
        hourly_path(&fields.wind_speed),
    ];
    let array_fields: Vec<String> = fields.names().iter().map(|f| f.to_string()).collect();

    let params = historical_params(config, &aggregated)?;
    let snapshot = fetch_table(
        source,
        &config.historical_url,
        &params,
        &required_fields,
        &array_fields,
    )
    .await?
    .lazy()
    .select([
        col(LATITUDE),
        col(LONGITUDE),
        col(fields.temperature.as_str()).alias(YEAR_START_TEMP),
        col(fields.humidity.as_str()).alias(YEAR_START_HUMIDITY),
        col(fields.wind_speed.as_str()).alias(YEAR_START_WIND_SPEED),
    ]);

    let locations = aggregated.height();
    let enriched = aggregated
        .lazy()
        .join(
            snapshot,
            [col(LATITUDE), col(LONGITUDE)],
            [col(LATITUDE), col(LONGITUDE)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    if enriched.height() < locations {
        warn!(
            "{} location(s) dropped: no historical reading at {}",
            locations - enriched.height(),
            config.historical_timestamp()
        );
    }
    info!(
        "Enriched {} location(s) with the {} snapshot",
        enriched.height(),
        config.historical_timestamp()
    );
    Ok(enriched)
}

fn joined_column(frame: &DataFrame, name: &str) -> Result<String, SchemaError> {
    let column = frame.column(name).map_err(|_| SchemaError::MissingColumn {
        column: name.to_string(),
    })?;
    let values = column.str().map_err(|e| SchemaError::ColumnType {
        column: name.to_string(),
        source: e,
    })?;
    // Latitudes and longitudes are paired by position, a skipped null would misalign them.
    let values = values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| SchemaError::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(values.join(","))
}
