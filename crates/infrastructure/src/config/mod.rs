//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `meteogram.toml` (or an explicit file), then `METEOGRAM_*` environment
//! variables using `__` between nested keys, e.g.
//! `METEOGRAM_CACHE__TTL_SECS=600`.
//!
//! - `cache`: response cache location and TTL
//! - `output`: output directory, navigation page, publishing, logging

mod cache;
mod output;

use std::path::Path;

use application::services::PipelineSettings;
use config::builder::{ConfigBuilder, DefaultState};
use config::{ConfigError, Environment, File};
use integration_openmeteo::OpenMeteoConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retry::RetryConfig;

pub use cache::CacheConfig;
pub use output::{LoggingConfig, OutputConfig, PublishConfig};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "meteogram";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "METEOGRAM";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Open-Meteo client settings
    #[serde(default)]
    pub openmeteo: OpenMeteoConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry policy for the forecast download
    #[serde(default)]
    pub retry: RetryConfig,

    /// Transformation rules
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Output files
    #[serde(default)]
    pub output: OutputConfig,

    /// Git publishing
    #[serde(default)]
    pub publish: PublishConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, a file and the environment
    ///
    /// With `path` set the file must exist; otherwise `meteogram.toml` in
    /// the working directory is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed, a value has the wrong
    /// type, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::from_builder(config::Config::builder().add_source(file))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        debug!(
            output = %config.output.directory.display(),
            cache = config.cache.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check values serde cannot constrain
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openmeteo.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "openmeteo.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(1..=16).contains(&self.openmeteo.forecast_days) {
            return Err(ConfigError::Message(
                "openmeteo.forecast_days must be between 1 and 16".to_string(),
            ));
        }
        if self.output.navigation_token.is_empty() {
            return Err(ConfigError::Message(
                "output.navigation_token must not be empty".to_string(),
            ));
        }
        if self.publish.branch.is_empty() || self.publish.remote.is_empty() {
            return Err(ConfigError::Message(
                "publish.remote and publish.branch must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use domain::transform::{MissingModelPolicy, SnowRatio};

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::from_builder(
            config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.openmeteo.temperature_unit, "fahrenheit");
        assert_eq!(config.cache.ttl_secs, 3600);
        assert!(config.cache.enabled);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.output.navigation_template, "Template_forecast.html");
        assert_eq!(config.publish.branch, "master");
        assert_eq!(config.publish.remote, "origin");
        assert!(!config.logging.json);
        assert_eq!(config.pipeline, PipelineSettings::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = from_toml(
            r#"
            [openmeteo]
            timezone = "UTC"

            [cache]
            enabled = false
            ttl_secs = 600

            [pipeline]
            missing_models = "degrade"
            mean_exclusions = []

            [pipeline.snow_ratio]
            kind = "fixed"
            ratio = 12.0

            [output]
            directory = "site"

            [publish]
            branch = "main"
            "#,
        )
        .unwrap();

        assert_eq!(config.openmeteo.timezone, "UTC");
        assert_eq!(config.openmeteo.wind_speed_unit, "kn");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl().as_secs(), 600);
        assert_eq!(config.pipeline.missing_models, MissingModelPolicy::Degrade);
        assert!(config.pipeline.mean_exclusions.is_empty());
        assert_eq!(config.pipeline.snow_ratio, SnowRatio::Fixed { ratio: 12.0 });
        assert_eq!(config.output.template_path(), Path::new("site/Template_forecast.html"));
        assert_eq!(config.publish.branch, "main");
    }

    #[test]
    fn invalid_forecast_days_rejected() {
        let err = from_toml("[openmeteo]\nforecast_days = 30\n").unwrap_err();
        assert!(err.to_string().contains("forecast_days"));
    }

    #[test]
    fn empty_navigation_token_rejected() {
        assert!(from_toml("[output]\nnavigation_token = \"\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("meteogram.toml");
        std::fs::write(&path, "[logging]\njson = true\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(config.logging.json);
    }

    #[test]
    fn publish_repository_falls_back_to_output() {
        let publish = PublishConfig::default();
        assert_eq!(publish.repository_or(Path::new("site")), Path::new("site"));
    }
}
