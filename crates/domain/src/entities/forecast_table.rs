//! Time-indexed forecast tables
//!
//! A [`ForecastTable`] holds one [`TimeAxis`], ordered named columns (one per
//! model, or one per precipitation type) and an optional `Mean` column. Every
//! column has exactly one value per timestamp; missing values are `NaN`.

use chrono::{DateTime, Utc};

use super::{TimeAxis, Variable};
use crate::DomainError;
use crate::value_objects::Precision;

/// Column label used for the ensemble mean
pub const MEAN_COLUMN: &str = "Mean";

/// Named series of values aligned to a time axis
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    /// Create a column
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column label
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values, one per timestamp
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split into label and values
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<f64>) {
        (self.name, self.values)
    }
}

/// Forecast table for one variable
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    variable: Variable,
    axis: TimeAxis,
    columns: Vec<Column>,
    mean: Option<Vec<f64>>,
}

impl ForecastTable {
    /// Create a table without a mean column
    ///
    /// # Errors
    ///
    /// Returns `SourceFetch` if any column length differs from the axis.
    pub fn new(
        variable: Variable,
        axis: TimeAxis,
        columns: Vec<Column>,
    ) -> Result<Self, DomainError> {
        if let Some(bad) = columns.iter().find(|c| c.len() != axis.len()) {
            return Err(DomainError::length_mismatch(
                variable,
                bad.name(),
                axis.len(),
                bad.len(),
            ));
        }
        Ok(Self {
            variable,
            axis,
            columns,
            mean: None,
        })
    }

    /// Variable this table holds
    #[must_use]
    pub const fn variable(&self) -> Variable {
        self.variable
    }

    /// Shared time axis
    #[must_use]
    pub const fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Timestamps, one per row
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.axis.iter()
    }

    /// Number of rows
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.axis.len()
    }

    /// Columns in order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column labels in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Look up a column by label
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// The mean column, if computed
    #[must_use]
    pub fn mean(&self) -> Option<&[f64]> {
        self.mean.as_deref()
    }

    /// Attach a mean column
    ///
    /// # Errors
    ///
    /// Returns `Alignment` if the mean length differs from the axis.
    pub fn with_mean(mut self, mean: Vec<f64>) -> Result<Self, DomainError> {
        if mean.len() != self.axis.len() {
            return Err(DomainError::Alignment(format!(
                "{} mean has {} values, time axis has {}",
                self.variable,
                mean.len(),
                self.axis.len()
            )));
        }
        self.mean = Some(mean);
        Ok(self)
    }

    /// Relabel the table as another variable
    #[must_use]
    pub fn relabel(mut self, variable: Variable) -> Self {
        self.variable = variable;
        self
    }

    /// Drop every row earlier than `boundary`
    #[must_use]
    pub fn truncate_before(self, boundary: DateTime<Utc>) -> Self {
        let start = self.axis.first_index_at_or_after(boundary);
        if start == 0 {
            return self;
        }
        Self {
            variable: self.variable,
            axis: self.axis.tail_from(start),
            columns: self
                .columns
                .into_iter()
                .map(|c| {
                    let (name, values) = c.into_parts();
                    Column::new(name, values[start..].to_vec())
                })
                .collect(),
            mean: self.mean.map(|m| m[start..].to_vec()),
        }
    }

    /// Replace every column (and the mean) by applying `f` to its values
    #[must_use]
    pub fn map_series<F>(self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self {
            variable: self.variable,
            axis: self.axis,
            columns: self
                .columns
                .into_iter()
                .map(|c| {
                    let values = f(c.values());
                    Column::new(c.name, values)
                })
                .collect(),
            mean: self.mean.map(|m| f(&m)),
        }
    }

    /// Round every column and the mean to the given precision
    #[must_use]
    pub fn rounded(self, precision: Precision) -> Self {
        self.map_series(|values| precision.apply_all(values))
    }

    /// Check that another table shares this table's axis and column labels
    ///
    /// # Errors
    ///
    /// Returns `Alignment` describing the first difference found.
    pub fn ensure_aligned_with(&self, other: &Self) -> Result<(), DomainError> {
        if self.axis != other.axis {
            return Err(DomainError::Alignment(format!(
                "{} and {} have different time axes",
                self.variable, other.variable
            )));
        }
        if !self.column_names().eq(other.column_names()) {
            return Err(DomainError::Alignment(format!(
                "{} and {} have different model columns",
                self.variable, other.variable
            )));
        }
        Ok(())
    }
}
