use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are WGS84 degrees represented as `f64`.
///
/// # Examples
///
/// ```
/// use weather_insights::LatLon;
///
/// let reykjavik = LatLon(64.1355, -21.8954);
/// assert_eq!(reykjavik.0, 64.1355); // Latitude
/// assert_eq!(reykjavik.1, -21.8954); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.0, self.1)
    }
}

/// A configured city name together with the coordinate the geocoder resolved it to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub location: LatLon,
}

impl City {
    pub fn new(name: impl Into<String>, location: LatLon) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// Joins the latitudes of `cities` into the comma separated list the weather source expects.
pub fn join_latitudes(cities: &[City]) -> String {
    cities
        .iter()
        .map(|city| city.location.0.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Joins the longitudes of `cities` into the comma separated list the weather source expects.
pub fn join_longitudes(cities: &[City]) -> String {
    cities
        .iter()
        .map(|city| city.location.1.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
