//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: the Open-Meteo
//! source with its response cache and retry policy, the Plotly chart
//! renderer, the navigation page writer and the git publisher. Also owns
//! configuration loading and logging setup.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod retry;
pub mod telemetry;

pub use adapters::*;
pub use cache::{RedbCache, generate_cache_key, response_cache_key};
pub use config::{AppConfig, CacheConfig, LoggingConfig, OutputConfig, PublishConfig};
pub use retry::{RetryConfig, RetryResult, Retryable, with_retry};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
