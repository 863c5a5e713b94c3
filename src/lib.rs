mod aggregation;
mod config;
mod enrichment;
mod error;
mod geocoding;
mod insights;
mod output;
mod sink;
mod types;
mod utils;
mod weather_data;

#[cfg(test)]
mod test_utils;

pub use error::WeatherInsightsError;
pub use insights::WeatherInsights;

pub use config::{ConfigError, HistoricalFields, PipelineConfig};
pub use output::{split_output, WeatherTables};
pub use types::lat_lon::{City, LatLon};
pub use types::records::{CityRecord, WeatherInsightRecord};

pub use aggregation::engine::{aggregate_windows, AggregationSettings};
pub use aggregation::error::AggregationError;
pub use aggregation::windows::WindowFrameExt;
pub use enrichment::append_historical;

pub use geocoding::error::ResolutionError;
pub use geocoding::nominatim::NominatimGeocoder;
pub use geocoding::resolver::resolve_cities;
pub use geocoding::Geocoder;

pub use weather_data::error::{FetchError, SchemaError};
pub use weather_data::forecast::fetch_forecast_window;
pub use weather_data::normalize::{fetch_table, normalize_response};
pub use weather_data::source::{HttpWeatherSource, QueryParams, WeatherSource};

pub use sink::{ParquetSink, RecordSink, SinkError};
