use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No location found for city '{city}'")]
    NotFound { city: String },

    #[error("Failed to build geocoding HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Geocoding request failed for city '{city}'")]
    Request {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Geocoding request for city '{city}' failed with status {status}")]
    HttpStatus {
        city: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode geocoding response for city '{city}'")]
    Decode {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Geocoder returned an invalid coordinate '{value}' for city '{city}'")]
    InvalidCoordinate { city: String, value: String },
}
