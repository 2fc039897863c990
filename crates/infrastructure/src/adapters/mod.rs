//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod git_publisher;
mod navigation_writer;
mod openmeteo_source_adapter;
mod plotly_renderer;

pub use git_publisher::{GitPublisher, commit_message};
pub use navigation_writer::NavigationWriter;
pub use openmeteo_source_adapter::OpenMeteoSourceAdapter;
pub use plotly_renderer::{PlotlyRenderer, TICK_FORMAT, TICK_SPACING_MS, X_AXIS_TITLE, figure};
