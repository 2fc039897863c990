//! Open-Meteo forecast client
//!
//! HTTP client for the multi-model hourly endpoint of the Open-Meteo API.
//! URL building, transport and decoding are separate steps so callers can
//! put a cache between them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::{
    ApiErrorBody, ApiResponse, DEFAULT_INTERVAL_SECS, HourlyForecast, HourlyRequest,
};

/// Open-Meteo client errors
#[derive(Debug, Error)]
pub enum OpenMeteoError {
    /// Connection to the service failed or timed out
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request was rejected
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API reported an error for the request
    #[error("API error: {0}")]
    ApiError(String),

    /// Failed to parse the response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request cannot be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl OpenMeteoError {
    /// Whether repeating the request may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::ServiceUnavailable(_) | Self::RateLimitExceeded
        )
    }
}

/// Open-Meteo client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenMeteoConfig {
    /// API base URL (default: <https://api.open-meteo.com/v1>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Number of forecast days (1-16, default: 7)
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Timezone sent with the request (default: America/New_York)
    ///
    /// Timestamps are always decoded as UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Temperature unit (default: fahrenheit)
    #[serde(default = "default_temperature_unit")]
    pub temperature_unit: String,

    /// Wind speed unit (default: kn)
    #[serde(default = "default_wind_speed_unit")]
    pub wind_speed_unit: String,

    /// Precipitation unit (default: inch)
    #[serde(default = "default_precipitation_unit")]
    pub precipitation_unit: String,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_forecast_days() -> u8 {
    7
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_temperature_unit() -> String {
    "fahrenheit".to_string()
}

fn default_wind_speed_unit() -> String {
    "kn".to_string()
}

fn default_precipitation_unit() -> String {
    "inch".to_string()
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            forecast_days: default_forecast_days(),
            timezone: default_timezone(),
            temperature_unit: default_temperature_unit(),
            wind_speed_unit: default_wind_speed_unit(),
            precipitation_unit: default_precipitation_unit(),
        }
    }
}

/// Client trait for fetching hourly multi-model forecasts
#[async_trait]
pub trait HourlyForecastClient: Send + Sync {
    /// Fetch and decode every requested (variable, model) series
    async fn hourly(&self, request: &HourlyRequest) -> Result<HourlyForecast, OpenMeteoError>;
}

/// Open-Meteo HTTP client implementation
#[derive(Debug)]
pub struct OpenMeteoClient {
    client: Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: OpenMeteoConfig) -> Result<Self, OpenMeteoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OpenMeteoError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &OpenMeteoConfig {
        &self.config
    }

    fn validate(request: &HourlyRequest) -> Result<(), OpenMeteoError> {
        if !(-90.0..=90.0).contains(&request.latitude)
            || !(-180.0..=180.0).contains(&request.longitude)
        {
            return Err(OpenMeteoError::InvalidCoordinates);
        }
        if request.variables.is_empty() {
            return Err(OpenMeteoError::InvalidRequest("no variables requested".to_string()));
        }
        if request.models.is_empty() {
            return Err(OpenMeteoError::InvalidRequest("no models requested".to_string()));
        }
        Ok(())
    }

    /// Full request URL, deterministic for identical requests
    ///
    /// # Errors
    ///
    /// Returns an error for invalid coordinates, empty variable or model
    /// lists, or an unusable base URL.
    pub fn hourly_url(&self, request: &HourlyRequest) -> Result<String, OpenMeteoError> {
        Self::validate(request)?;
        let params = [
            ("latitude", request.latitude.to_string()),
            ("longitude", request.longitude.to_string()),
            ("hourly", request.variables.join(",")),
            ("models", request.models.join(",")),
            ("temperature_unit", self.config.temperature_unit.clone()),
            ("wind_speed_unit", self.config.wind_speed_unit.clone()),
            ("precipitation_unit", self.config.precipitation_unit.clone()),
            ("timeformat", "unixtime".to_string()),
            ("timezone", self.config.timezone.clone()),
            (
                "forecast_days",
                self.config.forecast_days.clamp(1, 16).to_string(),
            ),
        ];
        let base = format!("{}/forecast", self.config.base_url.trim_end_matches('/'));
        Url::parse_with_params(&base, &params)
            .map(String::from)
            .map_err(|e| OpenMeteoError::InvalidRequest(format!("bad base URL: {e}")))
    }

    /// GET a URL and return the response body
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self))]
    pub async fn fetch_body(&self, url: &str) -> Result<String, OpenMeteoError> {
        debug!("Fetching hourly forecast");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                OpenMeteoError::ConnectionFailed(e.to_string())
            } else {
                OpenMeteoError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(OpenMeteoError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(OpenMeteoError::ServiceUnavailable(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OpenMeteoError::ConnectionFailed(e.to_string()))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.reason)
                .unwrap_or_default();
            return Err(if reason.is_empty() {
                OpenMeteoError::RequestFailed(format!("HTTP {status}"))
            } else {
                OpenMeteoError::ApiError(reason)
            });
        }

        Ok(body)
    }

    /// Decode a response body for the request that produced it
    ///
    /// Series missing from the response are left out. `null` values become
    /// `NaN`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` for malformed JSON, a missing `hourly` block,
    /// invalid timestamps or a series whose length differs from `time`.
    pub fn parse_hourly(
        body: &str,
        request: &HourlyRequest,
    ) -> Result<HourlyForecast, OpenMeteoError> {
        let response: ApiResponse =
            serde_json::from_str(body).map_err(|e| OpenMeteoError::ParseError(e.to_string()))?;
        let mut hourly = response
            .hourly
            .ok_or_else(|| OpenMeteoError::ParseError("no hourly data in response".to_string()))?;

        let timestamps = hourly
            .time
            .iter()
            .map(|&t| {
                DateTime::<Utc>::from_timestamp(t, 0)
                    .ok_or_else(|| OpenMeteoError::ParseError(format!("invalid timestamp {t}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let interval_secs = match hourly.time.as_slice() {
            [first, second, ..] => second - first,
            _ => DEFAULT_INTERVAL_SECS,
        };

        let mut forecast = HourlyForecast::new(
            response.latitude,
            response.longitude,
            timestamps,
            interval_secs,
        );
        for variable in &request.variables {
            for model in &request.models {
                let key = request.response_key(variable, model);
                let Some(raw) = hourly.values.remove(&key) else {
                    debug!(key = %key, "Series not in response");
                    continue;
                };
                if raw.len() != hourly.time.len() {
                    return Err(OpenMeteoError::ParseError(format!(
                        "{key} has {} values, time has {}",
                        raw.len(),
                        hourly.time.len()
                    )));
                }
                let values = raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                forecast.insert(variable, model, values);
            }
        }
        Ok(forecast)
    }
}

#[async_trait]
impl HourlyForecastClient for OpenMeteoClient {
    #[instrument(skip(self, request), fields(lat = %request.latitude, lon = %request.longitude, models = request.models.len()))]
    async fn hourly(&self, request: &HourlyRequest) -> Result<HourlyForecast, OpenMeteoError> {
        let url = self.hourly_url(request)?;
        let body = self.fetch_body(&url).await?;
        Self::parse_hourly(&body, request)
    }
}
