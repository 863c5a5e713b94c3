//! Name to coordinate lookup for the configured cities.

pub mod error;
pub mod nominatim;
pub mod resolver;

use crate::geocoding::error::ResolutionError;
use crate::types::lat_lon::LatLon;
use async_trait::async_trait;

/// A geocoding provider.
///
/// Returns `Ok(None)` when the provider answered but knows no location for `city`;
/// transport failures are reported as errors.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, city: &str) -> Result<Option<LatLon>, ResolutionError>;
}
