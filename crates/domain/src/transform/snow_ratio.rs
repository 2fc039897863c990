//! Snow-to-liquid ratio strategies
//!
//! Converts liquid-equivalent precipitation into snow depth. The ratio grows
//! as the air gets colder: the default linear rule gives 9:1 at 32°F and
//! 15:1 at 20°F.
//!
//! # Examples
//!
//! ```
//! use domain::transform::{SnowRatio, SnowRatioStrategy};
//!
//! let ratio = SnowRatio::default();
//! assert_eq!(ratio.ratio(32.0), 9.0);
//! assert_eq!(ratio.ratio(20.0), 15.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Converts a 2 m temperature (°F) into a snow-to-liquid ratio
pub trait SnowRatioStrategy: fmt::Debug + Send + Sync {
    /// Ratio at the given temperature; never negative
    fn ratio(&self, temperature_f: f64) -> f64;
}

/// Configurable snow-to-liquid ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnowRatio {
    /// `intercept + slope * T`, floored at zero
    Linear {
        #[serde(default = "default_intercept")]
        intercept: f64,
        #[serde(default = "default_slope")]
        slope: f64,
    },
    /// The same ratio at every temperature
    Fixed {
        #[serde(default = "default_fixed_ratio")]
        ratio: f64,
    },
}

const fn default_intercept() -> f64 {
    25.0
}

const fn default_slope() -> f64 {
    -0.5
}

const fn default_fixed_ratio() -> f64 {
    10.0
}

impl SnowRatio {
    /// Older, gentler linear rule (about 10:1 at 32°F)
    pub const LEGACY_LINEAR: Self = Self::Linear {
        intercept: 23.333_312,
        slope: -0.416_666,
    };

    /// Classic 10:1 rule
    pub const TEN_TO_ONE: Self = Self::Fixed { ratio: 10.0 };
}

impl Default for SnowRatio {
    fn default() -> Self {
        Self::Linear {
            intercept: default_intercept(),
            slope: default_slope(),
        }
    }
}

impl SnowRatioStrategy for SnowRatio {
    fn ratio(&self, temperature_f: f64) -> f64 {
        let ratio = match *self {
            Self::Linear { intercept, slope } => slope.mul_add(temperature_f, intercept),
            Self::Fixed { ratio } => ratio,
        };
        // f64::max would turn NaN into 0
        if ratio < 0.0 { 0.0 } else { ratio }
    }
}

impl fmt::Display for SnowRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear { intercept, slope } => write!(f, "{intercept} + {slope}*T"),
            Self::Fixed { ratio } => write!(f, "{ratio}:1"),
        }
    }
}
