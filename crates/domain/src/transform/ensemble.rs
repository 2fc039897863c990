//! Cross-model ensemble mean

use serde::{Deserialize, Serialize};

use crate::DomainError;
use crate::entities::{BIAS_CORRECTED_DISPLAY_NAME, ForecastTable};

/// Computes the `Mean` column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsembleSummarizer {
    /// Column labels left out of the mean when present
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
}

fn default_exclusions() -> Vec<String> {
    vec![BIAS_CORRECTED_DISPLAY_NAME.to_string()]
}

impl Default for EnsembleSummarizer {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
        }
    }
}

impl EnsembleSummarizer {
    /// Summarizer with a custom exclusion list
    #[must_use]
    pub fn new(exclusions: Vec<String>) -> Self {
        Self { exclusions }
    }

    fn is_excluded(&self, column: &str) -> bool {
        self.exclusions.iter().any(|e| e == column)
    }

    /// Per-timestep mean across the included columns
    ///
    /// Missing values are skipped. A timestep where every included column is
    /// missing, or with no included columns at all, yields `NaN`.
    #[must_use]
    pub fn mean_of(&self, table: &ForecastTable) -> Vec<f64> {
        let included: Vec<&[f64]> = table
            .columns()
            .iter()
            .filter(|c| !self.is_excluded(c.name()))
            .map(|c| c.values())
            .collect();

        (0..table.row_count())
            .map(|row| nan_mean(included.iter().map(|values| values[row])))
            .collect()
    }

    /// Attach the mean column to a table
    ///
    /// # Errors
    ///
    /// Returns `Alignment` if the computed mean does not fit the table.
    pub fn summarize(&self, table: ForecastTable) -> Result<ForecastTable, DomainError> {
        let mean = self.mean_of(&table);
        table.with_mean(mean)
    }
}

/// Mean of the non-missing values, `NaN` if there are none
#[allow(clippy::cast_precision_loss)]
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Column, TimeAxis, Variable};
    use chrono::{TimeDelta, TimeZone, Utc};

    fn table(columns: Vec<Column>) -> ForecastTable {
        let len = columns.first().map_or(0, Column::len);
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let axis = TimeAxis::new(start, TimeDelta::hours(1), len).unwrap();
        ForecastTable::new(Variable::Temperature2m, axis, columns).unwrap()
    }

    #[test]
    fn mean_excludes_nbm() {
        let t = table(vec![
            Column::new("A", vec![2.0]),
            Column::new("B", vec![4.0]),
            Column::new("NBM", vec![100.0]),
        ]);
        let mean = EnsembleSummarizer::default().mean_of(&t);
        assert!((mean[0] - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_exclusion_is_ignored() {
        let t = table(vec![Column::new("A", vec![2.0]), Column::new("B", vec![5.0])]);
        let mean = EnsembleSummarizer::default().mean_of(&t);
        assert!((mean[0] - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_values_are_skipped() {
        let t = table(vec![
            Column::new("A", vec![1.0, f64::NAN]),
            Column::new("B", vec![f64::NAN, f64::NAN]),
            Column::new("C", vec![3.0, f64::NAN]),
        ]);
        let mean = EnsembleSummarizer::default().mean_of(&t);
        assert!((mean[0] - 2.0).abs() < f64::EPSILON);
        assert!(mean[1].is_nan());
    }

    #[test]
    fn custom_exclusions() {
        let t = table(vec![
            Column::new("A", vec![2.0]),
            Column::new("B", vec![4.0]),
            Column::new("NBM", vec![6.0]),
        ]);
        let summarizer = EnsembleSummarizer::new(vec!["A".to_string()]);
        assert!((summarizer.mean_of(&t)[0] - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summarize_attaches_mean() {
        let t = table(vec![Column::new("A", vec![1.0, 2.0])]);
        let t = EnsembleSummarizer::default().summarize(t).unwrap();
        assert_eq!(t.mean().unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn nan_mean_of_nothing_is_nan() {
        assert!(nan_mean(std::iter::empty()).is_nan());
    }
}
