//! Forecast transformation rules
//!
//! Pure functions and small rule objects that turn raw per-model arrays into
//! the finished tables of a run.

pub mod derive;
mod ensemble;
mod snow_ratio;
mod table_builder;

pub use derive::{FREEZING_F, PRECIP_TYPE_COLUMNS};
pub use ensemble::{EnsembleSummarizer, nan_mean};
pub use snow_ratio::{SnowRatio, SnowRatioStrategy};
pub use table_builder::{MissingModelPolicy, TableBuilder};
