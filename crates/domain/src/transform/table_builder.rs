//! Assembly of per-variable tables from raw source arrays

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DomainError;
use crate::entities::{
    BaseForecast, BaseTables, Column, ForecastTable, Model, ModelSet, RawForecast, Variable,
};

/// What to do when the source omits a configured model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingModelPolicy {
    /// Abort the run
    #[default]
    Fail,
    /// Drop the model from every table and continue
    Degrade,
}

/// Builds one table per fetched variable, columns in model-set order
#[derive(Debug, Clone)]
pub struct TableBuilder {
    models: ModelSet,
    policy: MissingModelPolicy,
}

impl TableBuilder {
    /// Create a builder for a model set
    #[must_use]
    pub const fn new(models: ModelSet, policy: MissingModelPolicy) -> Self {
        Self { models, policy }
    }

    /// Configured models
    #[must_use]
    pub const fn models(&self) -> &ModelSet {
        &self.models
    }

    /// Models lacking at least one fetched variable in `raw`
    fn missing_models(&self, raw: &RawForecast) -> Vec<Model> {
        self.models
            .iter()
            .filter(|m| !raw.has_model(m.id(), &Variable::FETCHED))
            .copied()
            .collect()
    }

    fn resolve_models(&self, missing: &[Model]) -> Result<ModelSet, DomainError> {
        if missing.is_empty() {
            return Ok(self.models.clone());
        }
        let names = missing
            .iter()
            .map(Model::display_name)
            .collect::<Vec<_>>()
            .join(", ");
        match self.policy {
            MissingModelPolicy::Fail => Err(DomainError::SourceFetch(format!(
                "no data for model(s): {names}"
            ))),
            MissingModelPolicy::Degrade => self
                .models
                .without(|m| missing.contains(m))
                .map_err(|_| DomainError::SourceFetch(format!("no model delivered data ({names})"))),
        }
    }

    /// Build the truncated base tables
    ///
    /// Every table keeps only rows at or after `boundary`.
    ///
    /// # Errors
    ///
    /// Returns `SourceFetch` if a model is missing under the `Fail` policy,
    /// if degrading leaves no model, or if any array length differs from the
    /// time axis.
    pub fn build(
        &self,
        raw: &RawForecast,
        boundary: DateTime<Utc>,
    ) -> Result<BaseForecast, DomainError> {
        let dropped = self.missing_models(raw);
        let models = self.resolve_models(&dropped)?;
        let axis = *raw.axis();

        let tables = BaseTables::try_from_fn(|variable| {
            let columns = models
                .iter()
                .map(|model| {
                    raw.get(variable, model.id())
                        .map(|values| Column::new(model.display_name(), values.to_vec()))
                        .ok_or_else(|| {
                            DomainError::SourceFetch(format!("{variable}/{} missing", model.id()))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ForecastTable::new(variable, axis, columns)?.truncate_before(boundary))
        })?;

        Ok(BaseForecast {
            models,
            dropped,
            boundary,
            tables,
        })
    }
}
