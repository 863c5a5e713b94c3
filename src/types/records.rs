use serde::{Deserialize, Serialize};

/// A row of the `cities_data` table.
///
/// Coordinates keep the exact text the weather source reported so they stay usable as join keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub latitude: String,
    pub longitude: String,
    pub elevation: f64,
    pub timezone: Option<String>,
}

/// A row of the `weather_aggregated` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInsightRecord {
    pub latitude: String,
    pub longitude: String,
    pub avg_temp_last_week: f64,
    pub avg_temp_next_week: f64,
    pub year_start_temp: Option<f64>,
    pub year_start_humidity: Option<f64>,
    pub year_start_wind_speed: Option<f64>,
}
