use crate::geocoding::error::ResolutionError;
use crate::geocoding::Geocoder;
use crate::types::lat_lon::City;
use log::{info, warn};

/// Resolves every city in `cities`, one lookup at a time, preserving order.
///
/// Fails on the first city the geocoder cannot place; downstream parameter lists are
/// positional, so a skipped city would shift every coordinate after it.
pub async fn resolve_cities(
    geocoder: &dyn Geocoder,
    cities: &[String],
) -> Result<Vec<City>, ResolutionError> {
    let mut resolved = Vec::with_capacity(cities.len());
    for name in cities {
        let location = geocoder
            .geocode(name)
            .await?
            .ok_or_else(|| ResolutionError::NotFound { city: name.clone() })?;
        info!("Adding city - {}, coordinates: {}", name, location);
        resolved.push(City::new(name.as_str(), location));
    }
    warn_on_shared_coordinates(&resolved);
    Ok(resolved)
}

// Locations are grouped by coordinate, so cities sharing one end up in a single row.
fn warn_on_shared_coordinates(cities: &[City]) {
    for (i, city) in cities.iter().enumerate() {
        if let Some(other) = cities[..i].iter().find(|c| c.location == city.location) {
            warn!(
                "Cities '{}' and '{}' resolved to the same coordinates ({}); they will be aggregated as one location",
                other.name, city.name, city.location
            );
        }
    }
}
