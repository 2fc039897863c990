//! Open-Meteo forecast integration
//!
//! Client for the multi-model hourly forecast endpoint of the Open-Meteo API
//! (<https://open-meteo.com>). No API key is required.

pub mod client;
mod models;

pub use client::{HourlyForecastClient, OpenMeteoClient, OpenMeteoConfig, OpenMeteoError};
pub use models::{DEFAULT_INTERVAL_SECS, HourlyForecast, HourlyRequest};
