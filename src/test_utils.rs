//! Fakes and fixture builders shared by the unit tests.

use crate::geocoding::error::ResolutionError;
use crate::geocoding::Geocoder;
use crate::types::lat_lon::LatLon;
use crate::weather_data::error::FetchError;
use crate::weather_data::source::{QueryParams, WeatherSource};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("expected a value, got null");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Geocoder answering from a fixed table and recording every lookup.
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, LatLon>,
    lookups: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, name: &str, location: LatLon) -> Self {
        self.places.insert(name.to_string(), location);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, city: &str) -> Result<Option<LatLon>, ResolutionError> {
        self.lookups.lock().unwrap().push(city.to_string());
        Ok(self.places.get(city).copied())
    }
}

enum Reply {
    Body(Value),
    Status(StatusCode),
}

/// Weather source answering per URL and recording every request. Unknown URLs get a 404.
#[derive(Default)]
pub struct FakeWeatherSource {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl FakeWeatherSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: Value) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body));
        self
    }

    pub fn with_status(mut self, url: &str, status: StatusCode) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<QueryParams> {
        self.requests()
            .into_iter()
            .filter(|(u, _)| u == url)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl WeatherSource for FakeWeatherSource {
    async fn get_json(&self, url: &str, params: &QueryParams) -> Result<Value, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), params.clone()));
        match self.replies.get(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
                body: String::new(),
            }),
        }
    }
}

// Lets a test keep a handle on the source it hands to the pipeline.
#[async_trait]
impl WeatherSource for Arc<FakeWeatherSource> {
    async fn get_json(&self, url: &str, params: &QueryParams) -> Result<Value, FetchError> {
        self.as_ref().get_json(url, params).await
    }
}

/// Hourly timestamps: `past_days` days before midnight of `run_date`, then `future_days`
/// days starting at midnight.
fn hourly_times(run_date: NaiveDate, past_days: u32, future_days: u32) -> Vec<(NaiveDateTime, bool)> {
    let midnight = run_date.and_time(NaiveTime::MIN);
    let past = (past_days * 24) as i64;
    let future = (future_days * 24) as i64;
    (-past..future)
        .map(|h| (midnight + Duration::hours(h), h < 0))
        .collect()
}

/// One location of a forecast response with a constant temperature before and after
/// midnight of `run_date`.
#[allow(clippy::too_many_arguments)]
pub fn forecast_location(
    lat: f64,
    lon: f64,
    elevation: f64,
    timezone_abbreviation: &str,
    run_date: NaiveDate,
    past_days: u32,
    future_days: u32,
    past_temp: f64,
    future_temp: f64,
) -> Value {
    let hours = hourly_times(run_date, past_days, future_days);
    let times: Vec<String> = hours
        .iter()
        .map(|(t, _)| t.format(TIME_FORMAT).to_string())
        .collect();
    let temps: Vec<f64> = hours
        .iter()
        .map(|(_, past)| if *past { past_temp } else { future_temp })
        .collect();
    json!({
        "latitude": lat,
        "longitude": lon,
        "generationtime_ms": 0.05,
        "utc_offset_seconds": 0,
        "timezone": "GMT",
        "timezone_abbreviation": timezone_abbreviation,
        "elevation": elevation,
        "hourly_units": {"time": "iso8601", "temperature_2m": "°C"},
        "hourly": {"time": times, "temperature_2m": temps}
    })
}

/// One location of a historical response holding the 2024-01-01T00:00 reading.
pub fn historical_location(
    lat: f64,
    lon: f64,
    elevation: f64,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
) -> Value {
    json!({
        "latitude": lat,
        "longitude": lon,
        "generationtime_ms": 0.03,
        "utc_offset_seconds": 0,
        "timezone": "GMT",
        "timezone_abbreviation": "GMT",
        "elevation": elevation,
        "hourly_units": {
            "time": "iso8601",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h"
        },
        "hourly": {
            "time": ["2024-01-01T00:00"],
            "temperature_2m": [temperature],
            "relative_humidity_2m": [humidity],
            "wind_speed_10m": [wind_speed]
        }
    })
}

/// Builds the exploded observation frame the aggregation consumes.
#[derive(Default)]
pub struct ObservationFrame {
    latitudes: Vec<String>,
    longitudes: Vec<String>,
    elevations: Vec<f64>,
    timezones: Vec<String>,
    temperatures: Vec<Option<f64>>,
    times: Vec<String>,
}

impl ObservationFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(
        mut self,
        lat: &str,
        lon: &str,
        elevation: f64,
        timezone_abbreviation: &str,
        time: &str,
        temperature: Option<f64>,
    ) -> Self {
        self.latitudes.push(lat.to_string());
        self.longitudes.push(lon.to_string());
        self.elevations.push(elevation);
        self.timezones.push(timezone_abbreviation.to_string());
        self.temperatures.push(temperature);
        self.times.push(time.to_string());
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn location(
        mut self,
        lat: &str,
        lon: &str,
        elevation: f64,
        timezone_abbreviation: &str,
        run_date: NaiveDate,
        past_days: u32,
        future_days: u32,
        past_temp: f64,
        future_temp: f64,
    ) -> Self {
        for (time, past) in hourly_times(run_date, past_days, future_days) {
            let temperature = if past { past_temp } else { future_temp };
            self = self.sample(
                lat,
                lon,
                elevation,
                timezone_abbreviation,
                &time.format(TIME_FORMAT).to_string(),
                Some(temperature),
            );
        }
        self
    }

    pub fn build(self) -> DataFrame {
        DataFrame::new(vec![
            Column::new("latitude".into(), self.latitudes),
            Column::new("longitude".into(), self.longitudes),
            Column::new("elevation".into(), self.elevations),
            Column::new("timezone_abbreviation".into(), self.timezones),
            Column::new("temperature_2m".into(), self.temperatures),
            Column::new("time".into(), self.times),
        ])
        .unwrap()
    }
}
