//! Splits the enriched frame into the two tables handed to the sink.

use crate::aggregation::error::AggregationError;
use crate::error::WeatherInsightsError;
use crate::types::columns::{
    require_columns, AVG_TEMP_LAST_WEEK, AVG_TEMP_NEXT_WEEK, CITY_COLUMNS, ELEVATION,
    INSIGHT_COLUMNS, LATITUDE, LONGITUDE, TIMEZONE, YEAR_START_HUMIDITY, YEAR_START_TEMP,
    YEAR_START_WIND_SPEED,
};
use crate::types::records::{CityRecord, WeatherInsightRecord};
use crate::weather_data::error::SchemaError;
use polars::prelude::*;

/// The two output tables of a run. Both hold the same locations in the same order.
#[derive(Debug, Clone)]
pub struct WeatherTables {
    /// `latitude, longitude, elevation, timezone`
    pub cities: DataFrame,
    /// `latitude, longitude, avg_temp_last_week, avg_temp_next_week, year_start_temp,
    /// year_start_humidity, year_start_wind_speed`
    pub insights: DataFrame,
}

impl WeatherTables {
    /// Tables with the full output schema and no rows.
    pub fn empty() -> Result<Self, WeatherInsightsError> {
        let cities = DataFrame::new(vec![
            Column::new(LATITUDE.into(), Vec::<String>::new()),
            Column::new(LONGITUDE.into(), Vec::<String>::new()),
            Column::new(ELEVATION.into(), Vec::<f64>::new()),
            Column::new(TIMEZONE.into(), Vec::<String>::new()),
        ])?;
        let insights = DataFrame::new(vec![
            Column::new(LATITUDE.into(), Vec::<String>::new()),
            Column::new(LONGITUDE.into(), Vec::<String>::new()),
            Column::new(AVG_TEMP_LAST_WEEK.into(), Vec::<f64>::new()),
            Column::new(AVG_TEMP_NEXT_WEEK.into(), Vec::<f64>::new()),
            Column::new(YEAR_START_TEMP.into(), Vec::<f64>::new()),
            Column::new(YEAR_START_HUMIDITY.into(), Vec::<f64>::new()),
            Column::new(YEAR_START_WIND_SPEED.into(), Vec::<f64>::new()),
        ])?;
        Ok(Self { cities, insights })
    }

    pub fn len(&self) -> usize {
        self.cities.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn city_records(&self) -> Result<Vec<CityRecord>, SchemaError> {
        let latitudes = str_column(&self.cities, LATITUDE)?;
        let longitudes = str_column(&self.cities, LONGITUDE)?;
        let elevations = f64_column(&self.cities, ELEVATION)?;
        let timezones = str_column(&self.cities, TIMEZONE)?;

        (0..self.cities.height())
            .map(|idx| {
                Ok(CityRecord {
                    latitude: required_str(latitudes, LATITUDE, idx)?,
                    longitude: required_str(longitudes, LONGITUDE, idx)?,
                    elevation: elevations.get(idx).ok_or_else(|| SchemaError::NullValue {
                        column: ELEVATION.to_string(),
                        row: idx,
                    })?,
                    timezone: timezones.get(idx).map(str::to_string),
                })
            })
            .collect()
    }

    pub fn insight_records(&self) -> Result<Vec<WeatherInsightRecord>, WeatherInsightsError> {
        let frame = &self.insights;
        let latitudes = str_column(frame, LATITUDE)?;
        let longitudes = str_column(frame, LONGITUDE)?;
        let last_week = f64_column(frame, AVG_TEMP_LAST_WEEK)?;
        let next_week = f64_column(frame, AVG_TEMP_NEXT_WEEK)?;
        let temps = f64_column(frame, YEAR_START_TEMP)?;
        let humidities = f64_column(frame, YEAR_START_HUMIDITY)?;
        let wind_speeds = f64_column(frame, YEAR_START_WIND_SPEED)?;

        let mut records = Vec::with_capacity(frame.height());
        for idx in 0..frame.height() {
            let latitude = required_str(latitudes, LATITUDE, idx)?;
            let longitude = required_str(longitudes, LONGITUDE, idx)?;
            let mean = |values: &Float64Chunked, column: &str| {
                values
                    .get(idx)
                    .ok_or_else(|| AggregationError::UndefinedMean {
                        column: column.to_string(),
                        latitude: latitude.clone(),
                        longitude: longitude.clone(),
                    })
            };
            let avg_temp_last_week = mean(last_week, AVG_TEMP_LAST_WEEK)?;
            let avg_temp_next_week = mean(next_week, AVG_TEMP_NEXT_WEEK)?;
            records.push(WeatherInsightRecord {
                avg_temp_last_week,
                avg_temp_next_week,
                year_start_temp: temps.get(idx),
                year_start_humidity: humidities.get(idx),
                year_start_wind_speed: wind_speeds.get(idx),
                latitude,
                longitude,
            });
        }
        Ok(records)
    }
}

/// Projects `enriched` onto the two output schemas.
///
/// Fails with [`SchemaError::MissingColumn`] if any output column is absent.
pub fn split_output(enriched: &DataFrame) -> Result<WeatherTables, SchemaError> {
    Ok(WeatherTables {
        cities: project(enriched, &CITY_COLUMNS)?,
        insights: project(enriched, &INSIGHT_COLUMNS)?,
    })
}

fn project(frame: &DataFrame, columns: &[&str]) -> Result<DataFrame, SchemaError> {
    require_columns(frame, columns)?;
    frame
        .select(columns.iter().copied())
        .map_err(SchemaError::Projection)
}

fn str_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a StringChunked, SchemaError> {
    frame
        .column(name)
        .map_err(|_| SchemaError::MissingColumn {
            column: name.to_string(),
        })?
        .str()
        .map_err(|e| SchemaError::ColumnType {
            column: name.to_string(),
            source: e,
        })
}

fn f64_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, SchemaError> {
    frame
        .column(name)
        .map_err(|_| SchemaError::MissingColumn {
            column: name.to_string(),
        })?
        .f64()
        .map_err(|e| SchemaError::ColumnType {
            column: name.to_string(),
            source: e,
        })
}

fn required_str(values: &StringChunked, name: &str, idx: usize) -> Result<String, SchemaError> {
    values
        .get(idx)
        .map(str::to_string)
        .ok_or_else(|| SchemaError::NullValue {
            column: name.to_string(),
            row: idx,
        })
}
