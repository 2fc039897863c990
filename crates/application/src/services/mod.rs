//! Application services - Use case implementations

mod forecast_pipeline;
mod meteogram_service;

pub use forecast_pipeline::{ForecastPipeline, PipelineSettings};
pub use meteogram_service::{MeteogramService, RunReport, RunRequest};
