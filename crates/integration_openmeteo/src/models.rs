//! Forecast data models
//!
//! Wire types for the Open-Meteo hourly forecast endpoint and the decoded
//! per-model series handed to callers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Step assumed when the response holds fewer than two timestamps
pub const DEFAULT_INTERVAL_SECS: i64 = 3600;

/// One multi-model hourly request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRequest {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Hourly variable names, in request order
    pub variables: Vec<String>,
    /// Model identifiers, in request order
    pub models: Vec<String>,
}

impl HourlyRequest {
    /// Response key holding a variable's series for one model
    ///
    /// With a single model the API omits the model suffix.
    #[must_use]
    pub fn response_key(&self, variable: &str, model: &str) -> String {
        if self.models.len() == 1 {
            variable.to_string()
        } else {
            format!("{variable}_{model}")
        }
    }
}

/// Decoded hourly series for every (variable, model) pair delivered
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecast {
    /// Grid-point latitude returned by the API
    pub latitude: f64,
    /// Grid-point longitude returned by the API
    pub longitude: f64,
    /// Timestamps of every row, UTC
    pub timestamps: Vec<DateTime<Utc>>,
    /// Seconds between rows
    pub interval_secs: i64,
    series: HashMap<(String, String), Vec<f64>>,
}

impl HourlyForecast {
    pub(crate) fn new(
        latitude: f64,
        longitude: f64,
        timestamps: Vec<DateTime<Utc>>,
        interval_secs: i64,
    ) -> Self {
        Self {
            latitude,
            longitude,
            timestamps,
            interval_secs,
            series: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, variable: &str, model: &str, values: Vec<f64>) {
        self.series
            .insert((variable.to_string(), model.to_string()), values);
    }

    /// Series for a variable and model; `null`s are `NaN`
    #[must_use]
    pub fn series(&self, variable: &str, model: &str) -> Option<&[f64]> {
        self.series
            .get(&(variable.to_string(), model.to_string()))
            .map(Vec::as_slice)
    }

    /// Every delivered series
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[f64])> {
        self.series
            .iter()
            .map(|((v, m), values)| (v.as_str(), m.as_str(), values.as_slice()))
    }

    /// Number of delivered series
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}

/// Raw API response
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: Option<HourlyBlock>,
}

/// `hourly` object: `time` plus one array per response key
#[derive(Debug, Deserialize)]
pub(crate) struct HourlyBlock {
    pub time: Vec<i64>,
    #[serde(flatten)]
    pub values: HashMap<String, Vec<Option<f64>>>,
}

/// Error body returned with 4xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub reason: String,
}
