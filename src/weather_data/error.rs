use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build weather HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {status}: {body}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode JSON response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response shape: {message}")]
    UnexpectedShape { message: String },

    #[error("Failed to build frame from response")]
    Frame(#[from] PolarsError),
}

/// A frame does not have the shape a stage relies on, meaning a collaborator broke its contract.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Required column '{column}' not found")]
    MissingColumn { column: String },

    #[error("Column '{column}' has no value in row {row}")]
    NullValue { column: String, row: usize },

    #[error("Column '{column}' has an unexpected type")]
    ColumnType {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to project columns")]
    Projection(#[source] PolarsError),
}
