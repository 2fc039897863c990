//! Integration tests for the Open-Meteo source adapter
//!
//! Run the adapter against a mock server to cover retries of transient
//! failures and the on-disk response cache.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{CachePort, ForecastRequest, ForecastSourcePort};
use domain::entities::{Model, ModelSet, Variable};
use domain::value_objects::GeoLocation;
use infrastructure::{OpenMeteoSourceAdapter, RedbCache, RetryConfig};
use integration_openmeteo::OpenMeteoConfig;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn response() -> serde_json::Value {
    serde_json::json!({
        "latitude": 42.65,
        "longitude": -73.75,
        "hourly": {
            "time": [1768435200, 1768438800, 1768442400, 1768446000],
            "temperature_2m_gfs_global": [28.4, 27.9, null, 27.0],
            "temperature_2m_ecmwf_ifs025": [29.1, 28.5, 28.0, 27.5]
        }
    })
}

fn request() -> ForecastRequest {
    ForecastRequest {
        location: GeoLocation::albany(),
        models: ModelSet::new(vec![
            Model::new("gfs_global", "GFS"),
            Model::new("ecmwf_ifs025", "ECMWF"),
        ])
        .expect("valid model set"),
        variables: vec![Variable::Temperature2m],
    }
}

fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig::new(1, 5, 2.0, max_retries).without_jitter()
}

fn create_adapter(mock_server: &MockServer, retry: RetryConfig) -> OpenMeteoSourceAdapter {
    let config = OpenMeteoConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
        ..OpenMeteoConfig::default()
    };
    OpenMeteoSourceAdapter::new(config, retry).expect("Failed to create adapter")
}

// ============================================================================
// Retry
// ============================================================================

#[tokio::test]
async fn service_unavailable_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = create_adapter(&mock_server, fast_retry(3));
    let raw = adapter.fetch(&request()).await.expect("fetch succeeds");

    assert_eq!(raw.series_count(), 2);
    assert_eq!(raw.axis().len(), 4);
    let gfs = raw.get(Variable::Temperature2m, "gfs_global").unwrap();
    assert!(gfs[2].is_nan());
}

#[tokio::test]
async fn exhausted_retries_surface_the_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let adapter = create_adapter(&mock_server, fast_retry(2));
    let err = adapter.fetch(&request()).await.unwrap_err();

    assert!(matches!(err, ApplicationError::ExternalService(_)));
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Cannot initialize WeatherVariable from invalid String value"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = create_adapter(&mock_server, fast_retry(3));
    let err = adapter.fetch(&request()).await.unwrap_err();

    assert!(err.to_string().contains("WeatherVariable"));
}

// ============================================================================
// Response cache
// ============================================================================

#[tokio::test]
async fn second_fetch_is_served_from_cache() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cache = Arc::new(RedbCache::new(dir.path().join("responses.redb")).unwrap());
    let adapter = create_adapter(&mock_server, RetryConfig::disabled())
        .with_cache(cache.clone(), Duration::from_secs(300));

    let first = adapter.fetch(&request()).await.unwrap();
    let second = adapter.fetch(&request()).await.unwrap();

    assert_eq!(first.series_count(), second.series_count());
    assert_eq!(first.axis(), second.axis());
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn failed_parse_is_not_cached() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cache = Arc::new(RedbCache::new(dir.path().join("responses.redb")).unwrap());
    let adapter = create_adapter(&mock_server, RetryConfig::disabled())
        .with_cache(cache.clone(), Duration::from_secs(300));

    assert!(adapter.fetch(&request()).await.is_err());
    assert!(adapter.fetch(&request()).await.is_err());
    assert_eq!(cache.stats().hits, 0);
}
