//! Meteogram run service
//!
//! One run: fetch, transform, render every chart, write the navigation page
//! and optionally publish. Any failure aborts the run, except a missing
//! navigation template.

use std::{fmt, path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use domain::entities::{ForecastProducts, Model, Region};
use domain::value_objects::{GeoLocation, LocationName};
use tracing::{info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        ChartRendererPort, ChartSpec, ForecastRequest, ForecastSourcePort, NavigationOutcome,
        NavigationPort, PublisherPort,
    },
    services::ForecastPipeline,
};

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Label used in titles and file names
    pub name: LocationName,
    /// Forecast point
    pub location: GeoLocation,
    /// Wall-clock time of the run
    pub now: DateTime<Utc>,
    /// Push generated files when done
    pub publish: bool,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Region the location fell in
    pub region: Region,
    /// Models left out because the source did not deliver them
    pub dropped_models: Vec<Model>,
    /// Written chart files, in render order
    pub charts: Vec<PathBuf>,
    /// Navigation page result
    pub navigation: NavigationOutcome,
    /// Whether files were published
    pub published: bool,
}

/// Orchestrates the ports around the [`ForecastPipeline`]
pub struct MeteogramService {
    source: Arc<dyn ForecastSourcePort>,
    renderer: Arc<dyn ChartRendererPort>,
    navigation: Arc<dyn NavigationPort>,
    publisher: Option<Arc<dyn PublisherPort>>,
    pipeline: ForecastPipeline,
}

impl fmt::Debug for MeteogramService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeteogramService")
            .field("pipeline", &self.pipeline)
            .field("has_publisher", &self.publisher.is_some())
            .finish_non_exhaustive()
    }
}

impl MeteogramService {
    /// Create a service without publishing
    pub fn new(
        source: Arc<dyn ForecastSourcePort>,
        renderer: Arc<dyn ChartRendererPort>,
        navigation: Arc<dyn NavigationPort>,
        pipeline: ForecastPipeline,
    ) -> Self {
        Self {
            source,
            renderer,
            navigation,
            publisher: None,
            pipeline,
        }
    }

    /// Attach a publisher used when a run asks for it
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn PublisherPort>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Fetch and transform without writing anything
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the data cannot be transformed.
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn compute(
        &self,
        location: GeoLocation,
        now: DateTime<Utc>,
    ) -> Result<(Region, ForecastProducts), ApplicationError> {
        let region = Region::for_location(&location);
        let request = ForecastRequest::all_variables(location, region.models());
        info!(region = %region, models = request.models.len(), "Fetching forecast");

        let raw = self.source.fetch(&request).await?;
        let products = self.pipeline.run(&raw, &request.models, now)?;
        Ok((region, products))
    }

    /// Execute a full run
    ///
    /// # Errors
    ///
    /// Returns an error if fetching, transforming, rendering, writing the
    /// navigation page, or publishing fails.
    #[instrument(skip(self, request), fields(name = %request.name, location = %request.location))]
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, ApplicationError> {
        let (region, products) = self.compute(request.location, request.now).await?;
        let dropped_models: Vec<Model> = region
            .models()
            .iter()
            .filter(|m| !products.models.contains(m.display_name()))
            .copied()
            .collect();

        let mut charts = Vec::with_capacity(products.tables().len());
        for table in products.tables() {
            let chart = ChartSpec::for_table(table, &request.name, request.now);
            let path = self.renderer.render(table, &chart).await?;
            charts.push(path);
        }
        info!(count = charts.len(), "Charts written");

        let navigation = self.navigation.write_navigation(&request.name).await?;
        if let NavigationOutcome::TemplateMissing(template) = &navigation {
            warn!(template = %template.display(), "Navigation template not found, page skipped");
        }

        let published = match (&self.publisher, request.publish) {
            (Some(publisher), true) => {
                let stem = request.name.file_stem();
                info!(stem = %stem, "Publishing generated files");
                publisher.publish(&stem).await?;
                true
            },
            (None, true) => {
                return Err(ApplicationError::Configuration(
                    "publishing requested but no publisher is configured".to_string(),
                ));
            },
            (_, false) => false,
        };

        Ok(RunReport {
            region,
            dropped_models,
            charts,
            navigation,
            published,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        MockChartRendererPort, MockForecastSourcePort, MockNavigationPort, MockPublisherPort,
    };
    use chrono::{TimeDelta, TimeZone};
    use domain::entities::{RawForecast, TimeAxis};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 1, 15, 0).unwrap()
    }

    fn full_raw(request: &ForecastRequest) -> RawForecast {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let axis = TimeAxis::new(start, TimeDelta::hours(1), 12).unwrap();
        let mut raw = RawForecast::new(axis);
        for model in &request.models {
            for variable in &request.variables {
                raw.insert(*variable, model.id(), vec![30.0; 12]);
            }
        }
        raw
    }

    fn source() -> MockForecastSourcePort {
        let mut source = MockForecastSourcePort::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|request| Ok(full_raw(request)));
        source
    }

    fn renderer(expected_calls: usize) -> MockChartRendererPort {
        let mut renderer = MockChartRendererPort::new();
        renderer
            .expect_render()
            .times(expected_calls)
            .returning(|_, chart| Ok(PathBuf::from(&chart.file_name)));
        renderer
    }

    fn navigation(outcome: NavigationOutcome) -> MockNavigationPort {
        let mut navigation = MockNavigationPort::new();
        navigation
            .expect_write_navigation()
            .times(1)
            .returning(move |_| Ok(outcome.clone()));
        navigation
    }

    fn request(publish: bool) -> RunRequest {
        RunRequest {
            name: LocationName::new("Albany").unwrap(),
            location: GeoLocation::albany(),
            now: now(),
            publish,
        }
    }

    #[tokio::test]
    async fn run_renders_every_table() {
        let service = MeteogramService::new(
            Arc::new(source()),
            Arc::new(renderer(14)),
            Arc::new(navigation(NavigationOutcome::Written("Albany_forecast.html".into()))),
            ForecastPipeline::default(),
        );

        let report = service.run(request(false)).await.unwrap();

        assert_eq!(report.region, Region::Conus);
        assert_eq!(report.charts.len(), 14);
        assert_eq!(
            report.charts[0],
            PathBuf::from("Albany_temperature_2m_forecast.html")
        );
        assert_eq!(
            report.charts[13],
            PathBuf::from("Albany_precip_type_forecast.html")
        );
        assert!(report.dropped_models.is_empty());
        assert!(!report.published);
    }

    #[tokio::test]
    async fn missing_template_does_not_fail_run() {
        let service = MeteogramService::new(
            Arc::new(source()),
            Arc::new(renderer(14)),
            Arc::new(navigation(NavigationOutcome::TemplateMissing(
                "Template_forecast.html".into(),
            ))),
            ForecastPipeline::default(),
        );

        let report = service.run(request(false)).await.unwrap();
        assert!(matches!(report.navigation, NavigationOutcome::TemplateMissing(_)));
    }

    #[tokio::test]
    async fn publishes_with_location_stem() {
        let mut publisher = MockPublisherPort::new();
        publisher
            .expect_publish()
            .withf(|stem: &str| stem == "Albany")
            .times(1)
            .returning(|_| Ok(()));

        let service = MeteogramService::new(
            Arc::new(source()),
            Arc::new(renderer(14)),
            Arc::new(navigation(NavigationOutcome::Written("Albany_forecast.html".into()))),
            ForecastPipeline::default(),
        )
        .with_publisher(Arc::new(publisher));

        let report = service.run(request(true)).await.unwrap();
        assert!(report.published);
    }

    #[tokio::test]
    async fn source_failure_aborts_before_rendering() {
        let mut source = MockForecastSourcePort::new();
        source
            .expect_fetch()
            .returning(|_| Err(ApplicationError::ExternalService("HTTP 503".into())));
        let mut renderer = MockChartRendererPort::new();
        renderer.expect_render().never();
        let mut navigation = MockNavigationPort::new();
        navigation.expect_write_navigation().never();

        let service = MeteogramService::new(
            Arc::new(source),
            Arc::new(renderer),
            Arc::new(navigation),
            ForecastPipeline::default(),
        );

        let err = service.run(request(false)).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn render_failure_is_fatal() {
        let mut renderer = MockChartRendererPort::new();
        renderer
            .expect_render()
            .returning(|_, _| Err(ApplicationError::Rendering("disk full".into())));
        let mut navigation = MockNavigationPort::new();
        navigation.expect_write_navigation().never();

        let service = MeteogramService::new(
            Arc::new(source()),
            Arc::new(renderer),
            Arc::new(navigation),
            ForecastPipeline::default(),
        );

        let err = service.run(request(false)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Rendering(_)));
    }

    #[tokio::test]
    async fn publish_without_publisher_is_config_error() {
        let service = MeteogramService::new(
            Arc::new(source()),
            Arc::new(renderer(14)),
            Arc::new(navigation(NavigationOutcome::Written("Albany_forecast.html".into()))),
            ForecastPipeline::default(),
        );
        let err = service.run(request(true)).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[tokio::test]
    async fn compute_uses_global_models_outside_conus() {
        let mut source = MockForecastSourcePort::new();
        source
            .expect_fetch()
            .withf(|request| request.models.len() == 9 && !request.models.contains("HRRR"))
            .returning(|request| Ok(full_raw(request)));

        let service = MeteogramService::new(
            Arc::new(source),
            Arc::new(MockChartRendererPort::new()),
            Arc::new(MockNavigationPort::new()),
            ForecastPipeline::default(),
        );

        let berlin = GeoLocation::new(52.52, 13.405).unwrap();
        let (region, products) = service.compute(berlin, now()).await.unwrap();
        assert_eq!(region, Region::Global);
        assert_eq!(products.total_snow.column_names().count(), 9);
    }
}
