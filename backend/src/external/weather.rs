//! Weather API client for fetching current conditions
//!
//! Integrates with the OpenWeatherMap current weather endpoint. The payload is
//! returned untouched; normalization happens in the transform service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::Units;

use crate::error::{AppError, AppResult};

/// Source of raw current-weather payloads
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current observation for a location as raw JSON
    async fn fetch_current(&self, latitude: Decimal, longitude: Decimal, units: Units) -> AppResult<Value>;
}

/// OpenWeatherMap API client
#[derive(Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherMapClient {
    /// Create a client against `base_url`, e.g. `https://api.openweathermap.org/data/2.5`
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    async fn fetch_current(&self, latitude: Decimal, longitude: Decimal, units: Units) -> AppResult<Value> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", units.as_str().to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Fetch(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to parse weather response: {}", e)))
    }
}
