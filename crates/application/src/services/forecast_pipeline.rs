//! Forecast pipeline
//!
//! Turns one raw multi-model fetch into the finished tables of a run. Stages
//! run in a fixed order: build and truncate, derive, average, accumulate,
//! round. Every cross-table rule sees unrounded values.

use chrono::{DateTime, Utc};
use domain::entities::{
    BaseForecast, ForecastProducts, ForecastTable, ModelSet, RawForecast, Variable,
    truncation_boundary,
};
use domain::transform::derive::{frozen_precipitation, precip_type, running_total, snow_depth};
use domain::transform::{EnsembleSummarizer, MissingModelPolicy, SnowRatio, TableBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ApplicationError;

/// Tunable rules of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Snow-to-liquid ratio rule
    #[serde(default)]
    pub snow_ratio: SnowRatio,
    /// Handling of models the source did not deliver
    #[serde(default)]
    pub missing_models: MissingModelPolicy,
    /// Column labels left out of ensemble means
    #[serde(default = "default_mean_exclusions")]
    pub mean_exclusions: Vec<String>,
}

fn default_mean_exclusions() -> Vec<String> {
    EnsembleSummarizer::default().exclusions
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            snow_ratio: SnowRatio::default(),
            missing_models: MissingModelPolicy::default(),
            mean_exclusions: default_mean_exclusions(),
        }
    }
}

/// Pure, synchronous transformation of raw data into [`ForecastProducts`]
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    settings: PipelineSettings,
}

impl ForecastPipeline {
    /// Create a pipeline with the given settings
    #[must_use]
    pub const fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Active settings
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage for one fetch
    ///
    /// `now` fixes the truncation boundary for all tables.
    ///
    /// # Errors
    ///
    /// Returns a domain error if source arrays are misaligned, a model is
    /// missing under the `Fail` policy, or derived inputs disagree.
    #[instrument(skip(self, raw, models), fields(models = models.len(), rows = raw.axis().len()))]
    pub fn run(
        &self,
        raw: &RawForecast,
        models: &ModelSet,
        now: DateTime<Utc>,
    ) -> Result<ForecastProducts, ApplicationError> {
        let boundary = truncation_boundary(now)?;
        let BaseForecast {
            models,
            dropped,
            boundary,
            tables,
        } = TableBuilder::new(models.clone(), self.settings.missing_models).build(raw, boundary)?;

        for model in &dropped {
            warn!(model = %model, "Source delivered no data, model dropped from this run");
        }
        debug!(boundary = %boundary, rows = tables.temperature.row_count(), "Tables truncated");

        let frozen = frozen_precipitation(&tables.temperature, &tables.precipitation)?;
        let snow = snow_depth(
            &tables.temperature,
            &tables.precipitation,
            &tables.snowfall,
            &self.settings.snow_ratio,
        )?;
        let precip_type = precip_type(&tables.temperature, &tables.precipitation, &tables.snowfall)?;

        let summarizer = EnsembleSummarizer::new(self.settings.mean_exclusions.clone());
        let base = tables
            .try_map(|table| {
                if table.variable() == Variable::Snowfall {
                    summarizer.summarize(snow.clone())
                } else {
                    summarizer.summarize(table)
                }
            })?;
        let frozen = summarizer.summarize(frozen)?;

        let total_precipitation = running_total(&base.precipitation, Variable::TotalPrecipitation);
        let total_snow = running_total(&base.snowfall, Variable::TotalSnow);
        let total_frozen_precipitation =
            running_total(&frozen, Variable::TotalFrozenPrecipitation);

        let round = |table: ForecastTable| {
            let precision = table.variable().precision();
            table.rounded(precision)
        };

        Ok(ForecastProducts {
            models,
            boundary,
            base: base.try_map(|table| Ok(round(table)))?,
            frozen_precipitation: round(frozen),
            total_precipitation: round(total_precipitation),
            total_snow: round(total_snow),
            total_frozen_precipitation: round(total_frozen_precipitation),
            precip_type: round(precip_type),
        })
    }
}
