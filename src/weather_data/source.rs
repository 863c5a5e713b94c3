use crate::weather_data::error::FetchError;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

/// Ordered query parameters for a weather source request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// A source of weather JSON. One call per request; retries belong to the implementation.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn get_json(&self, url: &str, params: &QueryParams) -> Result<Value, FetchError>;
}

/// [`WeatherSource`] issuing plain HTTP GET requests.
pub struct HttpWeatherSource {
    client: Client,
}

impl HttpWeatherSource {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn get_json(&self, url: &str, params: &QueryParams) -> Result<Value, FetchError> {
        info!("Requesting weather data from {}", url);

        let response = self
            .client
            .get(url)
            .query(params.pairs())
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body usually carries the provider's reason, keep it for diagnostics.
            let body = response.text().await.unwrap_or_default();
            warn!("HTTP error for {}: {} {}", url, status, body);
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}
