//! Forecast source adapter - Implements ForecastSourcePort using integration_openmeteo

use std::sync::Arc;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{CachePort, DEFAULT_RESPONSE_TTL, ForecastRequest, ForecastSourcePort};
use async_trait::async_trait;
use chrono::TimeDelta;
use domain::DomainError;
use domain::entities::{RawForecast, TimeAxis};
use integration_openmeteo::{
    HourlyForecast, HourlyRequest, OpenMeteoClient, OpenMeteoConfig, OpenMeteoError,
};
use tracing::{debug, info, instrument, warn};

use crate::cache::response_cache_key;
use crate::retry::{RetryConfig, with_retry};

/// Adapter fetching multi-model forecasts from Open-Meteo
///
/// One HTTP request per run. Response bodies are cached by URL when a cache
/// is attached; transient failures are retried.
pub struct OpenMeteoSourceAdapter {
    client: OpenMeteoClient,
    retry: RetryConfig,
    cache: Option<Arc<dyn CachePort>>,
    cache_ttl: Duration,
}

impl std::fmt::Debug for OpenMeteoSourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenMeteoSourceAdapter")
            .field("base_url", &self.client.config().base_url)
            .field("retry", &self.retry)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenMeteoSourceAdapter {
    /// Create an adapter without a cache
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: OpenMeteoConfig, retry: RetryConfig) -> Result<Self, ApplicationError> {
        let client = OpenMeteoClient::new(config).map_err(Self::map_error)?;
        Ok(Self {
            client,
            retry,
            cache: None,
            cache_ttl: DEFAULT_RESPONSE_TTL,
        })
    }

    /// Attach a response cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CachePort>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    /// Map integration error to application error
    fn map_error(err: OpenMeteoError) -> ApplicationError {
        match err {
            OpenMeteoError::ConnectionFailed(e)
            | OpenMeteoError::RequestFailed(e)
            | OpenMeteoError::ServiceUnavailable(e) => ApplicationError::ExternalService(e),
            OpenMeteoError::RateLimitExceeded => ApplicationError::RateLimited,
            OpenMeteoError::ApiError(e) | OpenMeteoError::ParseError(e) => {
                DomainError::SourceFetch(e).into()
            },
            OpenMeteoError::InvalidCoordinates => {
                DomainError::ValidationError("coordinates out of range".to_string()).into()
            },
            OpenMeteoError::InvalidRequest(e) => ApplicationError::Configuration(e),
        }
    }

    fn hourly_request(request: &ForecastRequest) -> HourlyRequest {
        HourlyRequest {
            latitude: request.location.latitude(),
            longitude: request.location.longitude(),
            variables: request.variables.iter().map(|v| v.id().to_string()).collect(),
            models: request.models.ids().map(str::to_string).collect(),
        }
    }

    /// Convert decoded series into the domain representation
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeAxis` if the timestamps are not evenly spaced.
    fn to_raw(
        forecast: &HourlyForecast,
        request: &ForecastRequest,
    ) -> Result<RawForecast, ApplicationError> {
        let axis = TimeAxis::from_timestamps(
            &forecast.timestamps,
            TimeDelta::seconds(forecast.interval_secs),
        )?;
        let mut raw = RawForecast::new(axis);
        for variable in &request.variables {
            for model in &request.models {
                if let Some(series) = forecast.series(variable.id(), model.id()) {
                    raw.insert(*variable, model.id(), series.to_vec());
                }
            }
        }
        Ok(raw)
    }

    async fn cached_body(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get_bytes(key).await {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Cache read failed, fetching from source");
                None
            },
        }
    }

    async fn store_body(&self, key: &str, body: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache
                .set_bytes(key, body.as_bytes().to_vec(), self.cache_ttl)
                .await
            {
                warn!(error = %e, "Cache write failed");
            }
        }
    }
}

#[async_trait]
impl ForecastSourcePort for OpenMeteoSourceAdapter {
    #[instrument(skip(self, request), fields(location = %request.location, models = request.models.len()))]
    async fn fetch(&self, request: &ForecastRequest) -> Result<RawForecast, ApplicationError> {
        let hourly = Self::hourly_request(request);
        let url = self.client.hourly_url(&hourly).map_err(Self::map_error)?;
        let key = response_cache_key(&url);

        if let Some(body) = self.cached_body(&key).await {
            match OpenMeteoClient::parse_hourly(&body, &hourly) {
                Ok(forecast) => {
                    debug!("Serving forecast from cache");
                    return Self::to_raw(&forecast, request);
                },
                Err(e) => warn!(error = %e, "Cached response unreadable, refetching"),
            }
        }

        let result = with_retry(&self.retry, || self.client.fetch_body(&url)).await;
        let attempts = result.attempts;
        let body = result.into_result().map_err(Self::map_error)?;
        let forecast = OpenMeteoClient::parse_hourly(&body, &hourly).map_err(Self::map_error)?;
        let raw = Self::to_raw(&forecast, request)?;

        self.store_body(&key, &body).await;
        info!(
            attempts = attempts,
            series = raw.series_count(),
            rows = raw.axis().len(),
            "Forecast fetched"
        );
        Ok(raw)
    }
}
