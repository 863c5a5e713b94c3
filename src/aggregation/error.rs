use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Failed processing observation frame")]
    Polars(#[from] PolarsError),

    #[error("Cannot parse timestamp '{value}'")]
    TimestampParse { value: String },

    #[error("Mean '{column}' is undefined for location {latitude}, {longitude}")]
    UndefinedMean {
        column: String,
        latitude: String,
        longitude: String,
    },
}
