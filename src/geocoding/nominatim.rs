use crate::geocoding::error::ResolutionError;
use crate::geocoding::Geocoder;
use crate::types::lat_lon::LatLon;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

// Nominatim answers with coordinates encoded as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// [`Geocoder`] backed by an OpenStreetMap Nominatim search endpoint.
pub struct NominatimGeocoder {
    client: Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder for `search_url`. Nominatim rejects requests without a
    /// descriptive user agent, so one must be supplied.
    pub fn new(search_url: &str, user_agent: &str) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ResolutionError::ClientBuild)?;
        Ok(Self {
            client,
            search_url: search_url.to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, city: &str) -> Result<Option<LatLon>, ResolutionError> {
        debug!("Geocoding '{}' via {}", city, self.search_url);
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| ResolutionError::Request {
                city: city.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding HTTP error for '{}': {}", city, status);
            return Err(ResolutionError::HttpStatus {
                city: city.to_string(),
                status,
            });
        }

        let places: Vec<NominatimPlace> =
            response.json().await.map_err(|e| ResolutionError::Decode {
                city: city.to_string(),
                source: e,
            })?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let latitude = parse_coordinate(city, &place.lat)?;
        let longitude = parse_coordinate(city, &place.lon)?;
        Ok(Some(LatLon(latitude, longitude)))
    }
}

fn parse_coordinate(city: &str, value: &str) -> Result<f64, ResolutionError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolutionError::InvalidCoordinate {
            city: city.to_string(),
            value: value.to_string(),
        })
}
