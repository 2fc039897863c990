//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Source data is incomplete or does not line up with the time axis
    #[error("Source data error: {0}")]
    SourceFetch(String),

    /// Two tables expected to share a time axis and columns diverge
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// Time axis is not monotonically increasing with a constant step
    #[error("Invalid time axis: {0}")]
    InvalidTimeAxis(String),

    /// A model set must contain at least one model
    #[error("Model set is empty")]
    EmptyModelSet,

    /// Two models in one set share a display name
    #[error("Duplicate model in set: {0}")]
    DuplicateModel(String),

    /// Unknown variable identifier
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Date/time arithmetic error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

impl DomainError {
    /// Create a source error for an array whose length disagrees with the axis
    pub fn length_mismatch(
        variable: impl std::fmt::Display,
        column: impl std::fmt::Display,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::SourceFetch(format!(
            "{variable}/{column} has {actual} values, time axis has {expected}"
        ))
    }
}
