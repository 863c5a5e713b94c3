//! Two-stage temporal aggregation of the exploded hourly observations.

use crate::aggregation::error::AggregationError;
use crate::aggregation::windows::WindowFrameExt;
use crate::error::WeatherInsightsError;
use crate::types::columns::{
    require_columns, AVG_TEMP_LAST_WEEK, AVG_TEMP_NEXT_WEEK, ELEVATION, LATITUDE, LONGITUDE,
    TIME, TIMEZONE, TIMEZONE_ABBREVIATION,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use polars::prelude::*;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Thresholds and field names the aggregation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSettings {
    pub temperature_field: String,
    pub average_temp_threshold: f64,
    pub elevation_threshold: f64,
}

/// Aggregates hourly observations around `run_date`.
///
/// 1. Rows before local midnight of `run_date` are averaged per location
///    (`latitude, longitude, elevation`) into `avg_temp_last_week`.
/// 2. Locations failing the selection gate are cut.
/// 3. The full observation frame is inner-joined back onto the survivors, so the forward mean is
///    only computed for rows of gated locations.
/// 4. Rows at or after midnight are averaged into `avg_temp_next_week`, grouping by every
///    non-temperature column.
///
/// Timestamps are local wall-clock times of each location, compared against the naive
/// midnight of `run_date`.
///
/// A location without any lookback sample has no mean and cannot pass the gate. A gated
/// location without any forward sample is excluded from the result.
///
/// Returns columns `latitude, longitude, elevation, timezone, avg_temp_last_week,
/// avg_temp_next_week`, one row per location in order of first appearance.
///
/// Fails with [`SchemaError::MissingColumn`](crate::SchemaError::MissingColumn) if an input
/// column is absent.
pub fn aggregate_windows(
    observations: DataFrame,
    settings: &AggregationSettings,
    run_date: NaiveDate,
) -> Result<DataFrame, WeatherInsightsError> {
    let temperature = settings.temperature_field.as_str();
    require_columns(
        &observations,
        &[
            LATITUDE,
            LONGITUDE,
            ELEVATION,
            TIMEZONE_ABBREVIATION,
            TIME,
            temperature,
        ],
    )?;

    let midnight = run_date.and_time(NaiveTime::MIN);
    let observations = with_parsed_time(observations)?.lazy();
    let location_key = [col(LATITUDE), col(LONGITUDE), col(ELEVATION)];

    let gated = observations
        .clone()
        .past_window(midnight)
        .group_by_stable(location_key.clone())
        .agg([col(temperature).mean().alias(AVG_TEMP_LAST_WEEK)])
        .selection_gate(settings.average_temp_threshold, settings.elevation_threshold)
        .collect()
        .map_err(AggregationError::from)?;
    info!(
        "{} location(s) passed the selection gate (avg temp < {}, elevation > {})",
        gated.height(),
        settings.average_temp_threshold,
        settings.elevation_threshold
    );

    let aggregated = observations
        .join(
            gated.clone().lazy(),
            location_key.clone(),
            location_key,
            JoinArgs::new(JoinType::Inner),
        )
        .future_window(midnight)
        .group_by_stable([
            col(LATITUDE),
            col(LONGITUDE),
            col(ELEVATION),
            col(TIMEZONE_ABBREVIATION),
            col(AVG_TEMP_LAST_WEEK),
        ])
        .agg([col(temperature).mean().alias(AVG_TEMP_NEXT_WEEK)])
        .filter(col(AVG_TEMP_NEXT_WEEK).is_not_null())
        .select([
            col(LATITUDE),
            col(LONGITUDE),
            col(ELEVATION),
            col(TIMEZONE_ABBREVIATION).alias(TIMEZONE),
            col(AVG_TEMP_LAST_WEEK),
            col(AVG_TEMP_NEXT_WEEK),
        ])
        .collect()
        .map_err(AggregationError::from)?;

    if aggregated.height() < gated.height() {
        warn!(
            "{} gated location(s) excluded: no samples in the forward window",
            gated.height() - aggregated.height()
        );
    }
    Ok(aggregated)
}

/// Replaces the textual `time` column with a millisecond datetime column.
pub fn with_parsed_time(mut frame: DataFrame) -> Result<DataFrame, AggregationError> {
    if let Ok(DataType::Datetime(_, _)) = frame.column(TIME).map(|c| c.dtype()) {
        return Ok(frame);
    }

    let parsed = if frame.height() == 0 {
        Vec::new()
    } else {
        frame
            .column(TIME)?
            .str()?
            .into_iter()
            .map(|value| parse_timestamp(value.unwrap_or("null")))
            .collect::<Result<Vec<_>, _>>()?
    };

    let time = DatetimeChunked::from_naive_datetime(TIME.into(), parsed, TimeUnit::Milliseconds);
    frame.with_column(time.into_series())?;
    Ok(frame)
}

/// Parses a source timestamp such as `2024-01-01T00:00`.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, AggregationError> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| AggregationError::TimestampParse {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_close, ObservationFrame};
    use crate::weather_data::error::SchemaError;

    fn settings() -> AggregationSettings {
        AggregationSettings {
            temperature_field: "temperature_2m".to_string(),
            average_temp_threshold: 20.0,
            elevation_threshold: 50.0,
        }
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_past_and_future_means() -> Result<(), WeatherInsightsError> {
        let observations = ObservationFrame::new()
            .location("64.14", "-21.9", 100.0, "GMT", run_date(), 8, 8, 5.0, 8.0)
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 1);
        let names: Vec<&str> = aggregated
            .get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "latitude",
                "longitude",
                "elevation",
                "timezone",
                "avg_temp_last_week",
                "avg_temp_next_week"
            ]
        );
        assert_close(aggregated.column(AVG_TEMP_LAST_WEEK)?.f64()?.get(0), 5.0);
        assert_close(aggregated.column(AVG_TEMP_NEXT_WEEK)?.f64()?.get(0), 8.0);
        assert_eq!(aggregated.column(TIMEZONE)?.str()?.get(0), Some("GMT"));
        Ok(())
    }

    #[test]
    fn test_sample_at_midnight_counts_as_future() -> Result<(), WeatherInsightsError> {
        // If the midnight sample (40.0) were treated as past, the lookback mean would be 25
        // and the location would fail the gate.
        let observations = ObservationFrame::new()
            .sample("47.92", "106.92", 1350.0, "ULAT", "2024-03-09T23:00", Some(10.0))
            .sample("47.92", "106.92", 1350.0, "ULAT", "2024-03-10T00:00", Some(40.0))
            .sample("47.92", "106.92", 1350.0, "ULAT", "2024-03-10T01:00", Some(2.0))
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 1);
        assert_close(aggregated.column(AVG_TEMP_LAST_WEEK)?.f64()?.get(0), 10.0);
        assert_close(aggregated.column(AVG_TEMP_NEXT_WEEK)?.f64()?.get(0), 21.0);
        Ok(())
    }

    #[test]
    fn test_gate_cuts_warm_and_low_locations() -> Result<(), WeatherInsightsError> {
        let observations = ObservationFrame::new()
            // cold and high: kept
            .location("29.65", "91.1", 3650.0, "CST", run_date(), 2, 2, 3.0, 6.0)
            // cold but low
            .location("64.14", "-21.9", 30.0, "GMT", run_date(), 2, 2, 5.0, 8.0)
            // high but warm
            .location("-26.2", "28.04", 1753.0, "SAST", run_date(), 2, 2, 24.0, 22.0)
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 1);
        assert_eq!(aggregated.column(LATITUDE)?.str()?.get(0), Some("29.65"));
        for (avg, elevation) in aggregated
            .column(AVG_TEMP_LAST_WEEK)?
            .f64()?
            .into_iter()
            .zip(aggregated.column(ELEVATION)?.f64()?.into_iter())
        {
            assert!(avg.unwrap() < 20.0);
            assert!(elevation.unwrap() > 50.0);
        }
        Ok(())
    }

    #[test]
    fn test_location_without_past_samples_is_cut() -> Result<(), WeatherInsightsError> {
        let observations = ObservationFrame::new()
            .location("29.65", "91.1", 3650.0, "CST", run_date(), 0, 2, 0.0, 6.0)
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 0);
        Ok(())
    }

    #[test]
    fn test_location_without_future_samples_is_excluded() -> Result<(), WeatherInsightsError> {
        let observations = ObservationFrame::new()
            .location("29.65", "91.1", 3650.0, "CST", run_date(), 2, 0, 3.0, 0.0)
            .location("47.92", "106.92", 1350.0, "ULAT", run_date(), 2, 2, -10.0, -6.0)
            // Future samples exist but are all missing.
            .sample("50.45", "30.52", 179.0, "EET", "2024-03-09T12:00", Some(1.0))
            .sample("50.45", "30.52", 179.0, "EET", "2024-03-10T12:00", None)
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 1);
        assert_eq!(aggregated.column(LATITUDE)?.str()?.get(0), Some("47.92"));
        assert_eq!(aggregated.column(AVG_TEMP_NEXT_WEEK)?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_samples_are_skipped_not_zeroed() -> Result<(), WeatherInsightsError> {
        let observations = ObservationFrame::new()
            .sample("46.94", "7.44", 540.0, "CET", "2024-03-09T10:00", Some(4.0))
            .sample("46.94", "7.44", 540.0, "CET", "2024-03-09T11:00", None)
            .sample("46.94", "7.44", 540.0, "CET", "2024-03-09T12:00", Some(6.0))
            .sample("46.94", "7.44", 540.0, "CET", "2024-03-10T10:00", Some(9.0))
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_close(aggregated.column(AVG_TEMP_LAST_WEEK)?.f64()?.get(0), 5.0);
        assert_close(aggregated.column(AVG_TEMP_NEXT_WEEK)?.f64()?.get(0), 9.0);
        Ok(())
    }

    #[test]
    fn test_shared_coordinates_collapse_into_one_group() -> Result<(), WeatherInsightsError> {
        // Two cities the source snapped onto the same grid point.
        let observations = ObservationFrame::new()
            .location("29.65", "91.1", 3650.0, "CST", run_date(), 1, 1, 2.0, 4.0)
            .location("29.65", "91.1", 3650.0, "CST", run_date(), 1, 1, 4.0, 6.0)
            .build();

        let aggregated = aggregate_windows(observations, &settings(), run_date())?;

        assert_eq!(aggregated.height(), 1);
        assert_close(aggregated.column(AVG_TEMP_LAST_WEEK)?.f64()?.get(0), 3.0);
        assert_close(aggregated.column(AVG_TEMP_NEXT_WEEK)?.f64()?.get(0), 5.0);
        Ok(())
    }

    #[test]
    fn test_empty_observations() -> Result<(), WeatherInsightsError> {
        let aggregated =
            aggregate_windows(ObservationFrame::new().build(), &settings(), run_date())?;
        assert_eq!(aggregated.height(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_input_column_is_schema_error() -> PolarsResult<()> {
        let observations = ObservationFrame::new()
            .location("64.14", "-21.9", 100.0, "GMT", run_date(), 1, 1, 5.0, 8.0)
            .build()
            .drop("temperature_2m")?;

        let result = aggregate_windows(observations, &settings(), run_date());

        match result {
            Err(WeatherInsightsError::Schema(SchemaError::MissingColumn { column })) => {
                assert_eq!(column, "temperature_2m")
            }
            other => panic!("Expected a missing column error, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2024-01-01T00:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(parse_timestamp("2024-01-01T13:00:00").is_ok());
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AggregationError::TimestampParse { .. })
        ));
    }
}
