//! Decimal precision value object
//!
//! Rounds half to even on the scaled value. Missing values (`NaN`) and
//! infinities pass through unchanged.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::Precision;
//!
//! let p = Precision::new(1);
//! assert_eq!(p.apply(12.34), 12.3);
//! assert!(p.apply(f64::NAN).is_nan());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places kept when a column is finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Precision(u8);

impl Precision {
    /// Whole numbers (probabilities and angles)
    pub const WHOLE: Self = Self(0);
    /// Tenths (continuous physical quantities)
    pub const TENTHS: Self = Self(1);
    /// Hundredths (precipitation amounts)
    pub const HUNDREDTHS: Self = Self(2);

    /// Create a precision with the given number of decimals
    #[must_use]
    pub const fn new(decimals: u8) -> Self {
        Self(decimals)
    }

    /// Number of decimals
    #[must_use]
    pub const fn decimals(self) -> u8 {
        self.0
    }

    /// Round a single value
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let factor = 10f64.powi(i32::from(self.0));
        (value * factor).round_ties_even() / factor
    }

    /// Round every value of a series
    #[must_use]
    pub fn apply_all(self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.apply(*v)).collect()
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} decimals", self.0)
    }
}
