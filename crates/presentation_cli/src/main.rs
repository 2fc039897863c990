//! Meteogram CLI
//!
//! Fetches a multi-model forecast for one location, writes the charts and
//! the navigation page, and optionally publishes them with git.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::ports::{CachePort, NavigationOutcome};
use application::services::{ForecastPipeline, MeteogramService, RunReport, RunRequest};
use chrono::Utc;
use clap::Parser;
use domain::value_objects::{GeoLocation, LocationName};
use infrastructure::{
    AppConfig, GitPublisher, NavigationWriter, OpenMeteoSourceAdapter, PlotlyRenderer, RedbCache,
    TelemetryConfig, init_telemetry,
};
use tracing::{info, warn};

/// Multi-model meteogram generator
#[derive(Debug, Parser)]
#[command(name = "meteogram")]
#[command(author, version, about = "Multi-model Open-Meteo meteogram generator", long_about = None)]
struct Cli {
    /// Location label used in chart titles and file names
    #[arg(long, default_value = "Albany")]
    location: String,

    /// Latitude in degrees
    #[arg(long, default_value_t = 42.6526, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, default_value_t = -73.7562, allow_negative_numbers = true)]
    lon: f64,

    /// Commit and push the generated files
    #[arg(long)]
    git: bool,

    /// Configuration file (defaults to ./meteogram.toml when present)
    #[arg(short, long, env = "METEOGRAM_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the charts are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Wire the adapters described by `config` into a service
async fn build_service(config: &AppConfig) -> anyhow::Result<MeteogramService> {
    let mut source = OpenMeteoSourceAdapter::new(config.openmeteo.clone(), config.retry.clone())?;
    if config.cache.enabled {
        let cache = RedbCache::new(&config.cache.path)
            .with_context(|| format!("opening cache {}", config.cache.path.display()))?;
        match cache.cleanup_expired().await {
            Ok(removed) if removed > 0 => info!(removed, "Expired cache entries removed"),
            Ok(_) => {},
            Err(e) => warn!(error = %e, "Cache cleanup failed"),
        }
        let cache: Arc<dyn CachePort> = Arc::new(cache);
        source = source.with_cache(cache, config.cache.ttl());
    }

    let output = &config.output.directory;
    let renderer = PlotlyRenderer::new(output, config.output.plotly_js_url.clone())?;
    let navigation = NavigationWriter::new(
        output,
        config.output.template_path(),
        config.output.navigation_token.clone(),
    );
    let publisher = GitPublisher::new(
        config.publish.repository_or(output),
        output,
        config.publish.remote.clone(),
        config.publish.branch.clone(),
    );

    Ok(MeteogramService::new(
        Arc::new(source),
        Arc::new(renderer),
        Arc::new(navigation),
        ForecastPipeline::new(config.pipeline.clone()),
    )
    .with_publisher(Arc::new(publisher)))
}

fn print_report(name: &LocationName, report: &RunReport) {
    println!("🌦️  Forecast for {name} ({} models)", report.region);
    for chart in &report.charts {
        println!("   📈 {}", chart.display());
    }
    match &report.navigation {
        NavigationOutcome::Written(path) => println!("   🧭 {}", path.display()),
        NavigationOutcome::TemplateMissing(template) => {
            println!("   ⚠️  Navigation skipped, {} not found", template.display());
        },
    }
    if !report.dropped_models.is_empty() {
        let names: Vec<&str> = report
            .dropped_models
            .iter()
            .map(|m| m.display_name())
            .collect();
        println!("   ⚠️  Models not delivered: {}", names.join(", "));
    }
    if report.published {
        println!("✅ Published");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }
    if cli.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    init_telemetry(&TelemetryConfig::from_verbosity(
        cli.verbose,
        config.logging.level.as_deref(),
        config.logging.json,
    ))?;

    let name = LocationName::new(cli.location)?;
    let location = GeoLocation::new(cli.lat, cli.lon)?;
    let service = build_service(&config).await?;

    let report = service
        .run(RunRequest {
            name: name.clone(),
            location,
            now: Utc::now(),
            publish: cli.git,
        })
        .await?;

    print_report(&name, &report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_albany() {
        let cli = Cli::try_parse_from(["meteogram"]).unwrap();
        assert_eq!(cli.location, "Albany");
        assert!((cli.lat - 42.6526).abs() < f64::EPSILON);
        assert!((cli.lon + 73.7562).abs() < f64::EPSILON);
        assert!(!cli.git);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from([
            "meteogram",
            "--location",
            "Buenos Aires",
            "--lat",
            "-34.6",
            "--lon",
            "-58.4",
            "--git",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.location, "Buenos Aires");
        assert!((cli.lat + 34.6).abs() < f64::EPSILON);
        assert!(cli.git);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn output_dir_and_config_are_paths() {
        let cli = Cli::try_parse_from([
            "meteogram",
            "--output-dir",
            "site",
            "--config",
            "meteogram.toml",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, Some(PathBuf::from("site")));
        assert_eq!(cli.config, Some(PathBuf::from("meteogram.toml")));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn service_builds_without_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.cache.enabled = false;
        config.output.directory = dir.path().to_path_buf();
        assert!(build_service(&config).await.is_ok());
    }

    #[tokio::test]
    async fn service_builds_with_cache_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.cache.path = dir.path().join("cache").join("responses.redb");
        config.output.directory = dir.path().to_path_buf();
        assert!(build_service(&config).await.is_ok());
        assert!(config.cache.path.exists());
    }
}
