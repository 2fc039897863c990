//! Domain entities - Tables, axes and model sets of a forecast run

mod forecast_table;
mod model_set;
mod products;
mod raw_forecast;
mod time_axis;
mod variable;

pub use forecast_table::{Column, ForecastTable, MEAN_COLUMN};
pub use model_set::{BIAS_CORRECTED_DISPLAY_NAME, BoundingBox, Model, ModelSet, Region};
pub use products::{BaseForecast, BaseTables, ForecastProducts};
pub use raw_forecast::RawForecast;
pub use time_axis::{TimeAxis, truncation_boundary};
pub use variable::{MeanSource, Origin, Variable, VariableSpec};
