//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod cache_port;
mod chart_renderer_port;
mod forecast_source_port;
mod navigation_port;
mod publisher_port;

pub use cache_port::{CachePort, CacheStats, DEFAULT_RESPONSE_TTL};
#[cfg(test)]
pub use chart_renderer_port::MockChartRendererPort;
pub use chart_renderer_port::{
    ChartRendererPort, ChartSpec, LineEmphasis, LineStyle, MEAN_LINE_WIDTH, UPDATED_FORMAT,
};
#[cfg(test)]
pub use forecast_source_port::MockForecastSourcePort;
pub use forecast_source_port::{ForecastRequest, ForecastSourcePort};
#[cfg(test)]
pub use navigation_port::MockNavigationPort;
pub use navigation_port::{NavigationOutcome, NavigationPort};
#[cfg(test)]
pub use publisher_port::MockPublisherPort;
pub use publisher_port::PublisherPort;
