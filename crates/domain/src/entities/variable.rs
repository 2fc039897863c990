//! Forecast variables and their per-variable policy
//!
//! Every table the pipeline produces is identified by a [`Variable`]. The
//! behavior that differs between variables (display title, rounding, how the
//! `Mean` column is obtained) lives in one lookup, [`Variable::spec`], instead
//! of being spread over conditionals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;
use crate::value_objects::Precision;

/// How a table gets its `Mean` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanSource {
    /// Cross-model ensemble mean, bias-corrected products excluded
    Ensemble,
    /// Running sum of the source table's mean
    RunningSum,
    /// No mean column (columns are not models)
    None,
}

/// Where a table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Requested from the data source
    Fetched,
    /// Computed from other tables
    Derived,
}

/// Static policy attached to a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    /// Source API name and output file slug
    pub id: &'static str,
    /// Chart title prefix, including units
    pub title: &'static str,
    /// Decimals kept after all computations
    pub precision: Precision,
    /// How the mean column is obtained
    pub mean: MeanSource,
    /// Fetched or derived
    pub origin: Origin,
}

/// Every table produced by one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// 2 m air temperature (°F)
    Temperature2m,
    /// 2 m dew point (°F)
    DewPoint2m,
    /// Probability of precipitation (%)
    PrecipitationProbability,
    /// Hourly liquid-equivalent precipitation (in)
    Precipitation,
    /// Hourly snow depth (in); fetched as a frozen-precipitation signal,
    /// replaced by the ratio-derived depth
    Snowfall,
    /// Mean sea level pressure (mb)
    PressureMsl,
    /// Cloud cover (%)
    CloudCover,
    /// 10 m wind speed (kn)
    WindSpeed10m,
    /// 10 m wind direction (°)
    WindDirection10m,
    /// Precipitation falling at or below freezing (in)
    FrozenPrecipitation,
    /// Running total of precipitation (in)
    TotalPrecipitation,
    /// Running total of snow depth (in)
    TotalSnow,
    /// Running total of frozen precipitation (in)
    TotalFrozenPrecipitation,
    /// Share of models producing snow, rain or ice (%)
    PrecipType,
}

impl Variable {
    /// Variables requested from the data source, in request order
    pub const FETCHED: [Self; 9] = [
        Self::Temperature2m,
        Self::DewPoint2m,
        Self::PrecipitationProbability,
        Self::Precipitation,
        Self::Snowfall,
        Self::PressureMsl,
        Self::CloudCover,
        Self::WindSpeed10m,
        Self::WindDirection10m,
    ];

    /// Variables computed from fetched tables, in output order
    pub const DERIVED: [Self; 5] = [
        Self::FrozenPrecipitation,
        Self::TotalPrecipitation,
        Self::TotalSnow,
        Self::TotalFrozenPrecipitation,
        Self::PrecipType,
    ];

    /// Policy for this variable
    #[must_use]
    pub const fn spec(self) -> VariableSpec {
        const fn spec(
            id: &'static str,
            title: &'static str,
            precision: Precision,
            mean: MeanSource,
            origin: Origin,
        ) -> VariableSpec {
            VariableSpec {
                id,
                title,
                precision,
                mean,
                origin,
            }
        }

        use MeanSource::{Ensemble, RunningSum};
        use Origin::{Derived, Fetched};

        match self {
            Self::Temperature2m => spec(
                "temperature_2m",
                "2m Temp (deg F)",
                Precision::TENTHS,
                Ensemble,
                Fetched,
            ),
            Self::DewPoint2m => spec(
                "dew_point_2m",
                "2m Dewp (deg F)",
                Precision::TENTHS,
                Ensemble,
                Fetched,
            ),
            Self::PrecipitationProbability => spec(
                "precipitation_probability",
                "PoP (%)",
                Precision::WHOLE,
                Ensemble,
                Fetched,
            ),
            Self::Precipitation => spec(
                "precipitation",
                "Hourly Precip (in)",
                Precision::HUNDREDTHS,
                Ensemble,
                Fetched,
            ),
            Self::Snowfall => spec(
                "snowfall",
                "Hourly Snow (in)",
                Precision::TENTHS,
                Ensemble,
                Fetched,
            ),
            Self::PressureMsl => spec(
                "pressure_msl",
                "MSLP (mb)",
                Precision::TENTHS,
                Ensemble,
                Fetched,
            ),
            Self::CloudCover => spec(
                "cloud_cover",
                "Cloud Cover (%)",
                Precision::WHOLE,
                Ensemble,
                Fetched,
            ),
            Self::WindSpeed10m => spec(
                "wind_speed_10m",
                "10m WSpd (kts)",
                Precision::TENTHS,
                Ensemble,
                Fetched,
            ),
            Self::WindDirection10m => spec(
                "wind_direction_10m",
                "10m WDir (deg)",
                Precision::WHOLE,
                Ensemble,
                Fetched,
            ),
            Self::FrozenPrecipitation => spec(
                "frozen_qpf",
                "Hourly Frozen Precip (in)",
                Precision::HUNDREDTHS,
                Ensemble,
                Derived,
            ),
            Self::TotalPrecipitation => spec(
                "total_qpf",
                "Total Precip (in)",
                Precision::HUNDREDTHS,
                RunningSum,
                Derived,
            ),
            Self::TotalSnow => spec(
                "total_snow",
                "Total Snow (in)",
                Precision::TENTHS,
                RunningSum,
                Derived,
            ),
            Self::TotalFrozenPrecipitation => spec(
                "total_frozen_qpf",
                "Total Frozen Precip (in)",
                Precision::HUNDREDTHS,
                RunningSum,
                Derived,
            ),
            Self::PrecipType => spec(
                "precip_type",
                "Precip Type Probability Based on Model Output (%)",
                Precision::TENTHS,
                MeanSource::None,
                Derived,
            ),
        }
    }

    /// Source API name and file slug
    #[must_use]
    pub const fn id(self) -> &'static str {
        self.spec().id
    }

    /// Chart title prefix
    #[must_use]
    pub const fn title(self) -> &'static str {
        self.spec().title
    }

    /// Decimals kept after all computations
    #[must_use]
    pub const fn precision(self) -> Precision {
        self.spec().precision
    }

    /// Whether this variable is requested from the data source
    #[must_use]
    pub const fn is_fetched(self) -> bool {
        matches!(self.spec().origin, Origin::Fetched)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Variable {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::FETCHED
            .iter()
            .chain(Self::DERIVED.iter())
            .copied()
            .find(|v| v.id() == s)
            .ok_or_else(|| DomainError::UnknownVariable(s.to_string()))
    }
}
