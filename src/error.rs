use crate::aggregation::error::AggregationError;
use crate::config::ConfigError;
use crate::geocoding::error::ResolutionError;
use crate::sink::SinkError;
use crate::weather_data::error::{FetchError, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherInsightsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Failed to build output frame")]
    Polars(#[from] polars::prelude::PolarsError),
}
