//! Finished tables of one run
//!
//! Tables are held in named fields. Iteration helpers return them in a fixed
//! order: the fetched variables in request order, then the derived ones.

use chrono::{DateTime, Utc};

use super::{ForecastTable, Model, ModelSet, Variable};
use crate::DomainError;

/// One table per fetched variable, all sharing one axis and model columns
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTables {
    pub temperature: ForecastTable,
    pub dew_point: ForecastTable,
    pub precipitation_probability: ForecastTable,
    pub precipitation: ForecastTable,
    pub snowfall: ForecastTable,
    pub pressure: ForecastTable,
    pub cloud_cover: ForecastTable,
    pub wind_speed: ForecastTable,
    pub wind_direction: ForecastTable,
}

impl BaseTables {
    /// Build every table by calling `build` once per fetched variable
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `build`.
    pub fn try_from_fn<F>(mut build: F) -> Result<Self, DomainError>
    where
        F: FnMut(Variable) -> Result<ForecastTable, DomainError>,
    {
        Ok(Self {
            temperature: build(Variable::Temperature2m)?,
            dew_point: build(Variable::DewPoint2m)?,
            precipitation_probability: build(Variable::PrecipitationProbability)?,
            precipitation: build(Variable::Precipitation)?,
            snowfall: build(Variable::Snowfall)?,
            pressure: build(Variable::PressureMsl)?,
            cloud_cover: build(Variable::CloudCover)?,
            wind_speed: build(Variable::WindSpeed10m)?,
            wind_direction: build(Variable::WindDirection10m)?,
        })
    }

    /// Transform every table
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map<F>(self, mut f: F) -> Result<Self, DomainError>
    where
        F: FnMut(ForecastTable) -> Result<ForecastTable, DomainError>,
    {
        Ok(Self {
            temperature: f(self.temperature)?,
            dew_point: f(self.dew_point)?,
            precipitation_probability: f(self.precipitation_probability)?,
            precipitation: f(self.precipitation)?,
            snowfall: f(self.snowfall)?,
            pressure: f(self.pressure)?,
            cloud_cover: f(self.cloud_cover)?,
            wind_speed: f(self.wind_speed)?,
            wind_direction: f(self.wind_direction)?,
        })
    }

    /// Tables in request order
    #[must_use]
    pub fn tables(&self) -> [&ForecastTable; 9] {
        [
            &self.temperature,
            &self.dew_point,
            &self.precipitation_probability,
            &self.precipitation,
            &self.snowfall,
            &self.pressure,
            &self.cloud_cover,
            &self.wind_speed,
            &self.wind_direction,
        ]
    }
}

/// Fetched tables after truncation, before any derivation
#[derive(Debug, Clone, PartialEq)]
pub struct BaseForecast {
    /// Models that made it into the tables, in column order
    pub models: ModelSet,
    /// Models left out because the source did not deliver them
    pub dropped: Vec<Model>,
    /// First timestamp kept
    pub boundary: DateTime<Utc>,
    pub tables: BaseTables,
}

/// Every finished table of a run, rounded and ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastProducts {
    pub models: ModelSet,
    pub boundary: DateTime<Utc>,
    /// Fetched tables, with `snowfall` replaced by the ratio-derived depth
    pub base: BaseTables,
    pub frozen_precipitation: ForecastTable,
    pub total_precipitation: ForecastTable,
    pub total_snow: ForecastTable,
    pub total_frozen_precipitation: ForecastTable,
    pub precip_type: ForecastTable,
}

impl ForecastProducts {
    /// Tables in render order
    #[must_use]
    pub fn tables(&self) -> Vec<&ForecastTable> {
        let mut tables: Vec<&ForecastTable> = self.base.tables().to_vec();
        tables.extend([
            &self.frozen_precipitation,
            &self.total_precipitation,
            &self.total_snow,
            &self.total_frozen_precipitation,
            &self.precip_type,
        ]);
        tables
    }

    /// Look up a table by variable
    #[must_use]
    pub fn table(&self, variable: Variable) -> Option<&ForecastTable> {
        self.tables().into_iter().find(|t| t.variable() == variable)
    }
}
