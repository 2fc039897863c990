//! Raw per-model series as delivered by a forecast source

use std::collections::HashMap;

use super::{TimeAxis, Variable};

/// Hourly arrays keyed by variable and model source identifier
///
/// Arrays are stored as received. Length checks happen when tables are built.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    axis: TimeAxis,
    series: HashMap<(Variable, String), Vec<f64>>,
}

impl RawForecast {
    /// Create an empty forecast over an axis
    #[must_use]
    pub fn new(axis: TimeAxis) -> Self {
        Self {
            axis,
            series: HashMap::new(),
        }
    }

    /// Add (or replace) the series for a variable and model
    pub fn insert(&mut self, variable: Variable, model_id: impl Into<String>, values: Vec<f64>) {
        self.series.insert((variable, model_id.into()), values);
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_series(
        mut self,
        variable: Variable,
        model_id: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        self.insert(variable, model_id, values);
        self
    }

    /// Shared time axis
    #[must_use]
    pub const fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Series for a variable and model, if delivered
    #[must_use]
    pub fn get(&self, variable: Variable, model_id: &str) -> Option<&[f64]> {
        self.series
            .get(&(variable, model_id.to_string()))
            .map(Vec::as_slice)
    }

    /// Whether every listed variable was delivered for the model
    #[must_use]
    pub fn has_model(&self, model_id: &str, variables: &[Variable]) -> bool {
        variables.iter().all(|v| self.get(*v, model_id).is_some())
    }

    /// Number of delivered series
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }
}
