//! Chart renderer - Implements ChartRendererPort with Plotly HTML pages
//!
//! Each chart is a standalone HTML page: the figure is serialized as JSON
//! and drawn client-side by plotly.js. Missing values are written as `null`
//! so they show as gaps.

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use application::ports::{ChartRendererPort, ChartSpec, LineStyle};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::{ForecastTable, MEAN_COLUMN};
use serde_json::{Map, Value, json};
use tera::{Context, Tera};
use tracing::{debug, instrument};

/// X-axis tick spacing: 12 hours in milliseconds
pub const TICK_SPACING_MS: i64 = 12 * 60 * 60 * 1000;

/// X-axis tick label format
pub const TICK_FORMAT: &str = "%HZ\n%m-%d";

/// X-axis title
pub const X_AXIS_TITLE: &str = "Time/Date (UTC)";

const CHART_TEMPLATE_NAME: &str = "chart.html";

mod embedded {
    pub const CHART: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{{ page_title }}</title>
<script src="{{ plotly_js_url }}" charset="utf-8"></script>
</head>
<body>
<div id="{{ div_id }}" class="plotly-graph-div" style="height:100%; width:100%;"></div>
<script type="text/javascript">
var figure = {{ figure | safe }};
Plotly.newPlot("{{ div_id }}", figure.data, figure.layout, {"responsive": true});
</script>
</body>
</html>
"#;
}

/// Writes one Plotly HTML file per table
pub struct PlotlyRenderer {
    directory: PathBuf,
    plotly_js_url: String,
    tera: Tera,
}

impl std::fmt::Debug for PlotlyRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotlyRenderer")
            .field("directory", &self.directory)
            .field("plotly_js_url", &self.plotly_js_url)
            .finish_non_exhaustive()
    }
}

fn x_label(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn y_value(value: f64) -> Value {
    if value.is_finite() { json!(value) } else { Value::Null }
}

fn trace(name: &str, x: &[String], values: &[f64], style: LineStyle) -> Value {
    let mut line = Map::new();
    if let Some(color) = style.color {
        line.insert("color".to_string(), json!(color));
    }
    if let Some(width) = style.width {
        line.insert("width".to_string(), json!(width));
    }
    json!({
        "type": "scatter",
        "mode": "markers+lines",
        "name": name,
        "x": x,
        "y": values.iter().copied().map(y_value).collect::<Vec<_>>(),
        "line": line,
        "marker": style.color.map_or_else(|| json!({}), |c| json!({ "color": c })),
    })
}

/// Plotly figure (`data` and `layout`) for a table
///
/// Traces follow column order with the mean, if any, last.
#[must_use]
pub fn figure(table: &ForecastTable, chart: &ChartSpec) -> Value {
    let x: Vec<String> = table.timestamps().map(x_label).collect();

    let mut data: Vec<Value> = table
        .columns()
        .iter()
        .map(|column| {
            trace(
                column.name(),
                &x,
                column.values(),
                chart.line_style(column.name()),
            )
        })
        .collect();
    if let Some(mean) = table.mean() {
        data.push(trace(MEAN_COLUMN, &x, mean, chart.line_style(MEAN_COLUMN)));
    }

    json!({
        "data": data,
        "layout": {
            "title": { "text": chart.title, "x": 0.5 },
            "xaxis": {
                "title": { "text": X_AXIS_TITLE },
                "type": "date",
                "dtick": TICK_SPACING_MS,
                "tickformat": TICK_FORMAT,
            },
            "yaxis": { "title": { "text": Value::Null } },
            "legend": { "title": { "text": chart.legend_title } },
            "hovermode": "x unified",
        },
    })
}

impl PlotlyRenderer {
    /// Create a renderer writing into `directory`
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded page template fails to compile.
    pub fn new(
        directory: impl Into<PathBuf>,
        plotly_js_url: impl Into<String>,
    ) -> Result<Self, ApplicationError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);
        tera.add_raw_template(CHART_TEMPLATE_NAME, embedded::CHART)
            .map_err(|e| ApplicationError::Internal(format!("Chart template: {e}")))?;
        Ok(Self {
            directory: directory.into(),
            plotly_js_url: plotly_js_url.into(),
            tera,
        })
    }

    /// Output directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Render the HTML page for a table
    ///
    /// # Errors
    ///
    /// Returns `Rendering` if the figure cannot be serialized or the
    /// template fails.
    pub fn render_page(
        &self,
        table: &ForecastTable,
        chart: &ChartSpec,
    ) -> Result<String, ApplicationError> {
        let figure = serde_json::to_string(&figure(table, chart))
            .map_err(|e| ApplicationError::Rendering(e.to_string()))?
            .replace("</", "<\\/");

        let mut context = Context::new();
        context.insert("page_title", &chart.title.replace("<br>", " - "));
        context.insert("plotly_js_url", &self.plotly_js_url);
        context.insert("div_id", table.variable().id());
        context.insert("figure", &figure);

        self.tera
            .render(CHART_TEMPLATE_NAME, &context)
            .map_err(|e| ApplicationError::Rendering(e.to_string()))
    }
}

#[async_trait]
impl ChartRendererPort for PlotlyRenderer {
    #[instrument(skip(self, table, chart), fields(file = %chart.file_name, rows = table.row_count()))]
    async fn render(
        &self,
        table: &ForecastTable,
        chart: &ChartSpec,
    ) -> Result<PathBuf, ApplicationError> {
        let page = self.render_page(table, chart)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| ApplicationError::Rendering(format!("{}: {e}", self.directory.display())))?;

        let path = self.directory.join(&chart.file_name);
        tokio::fs::write(&path, page)
            .await
            .map_err(|e| ApplicationError::Rendering(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "Chart written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::ports::LineEmphasis;
    use chrono::{TimeDelta, TimeZone};
    use domain::entities::{Column, TimeAxis, Variable};
    use tempfile::TempDir;

    fn table() -> ForecastTable {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 2, 0, 0).unwrap();
        let axis = TimeAxis::new(start, TimeDelta::hours(1), 3).unwrap();
        ForecastTable::new(
            Variable::Temperature2m,
            axis,
            vec![
                Column::new("GFS", vec![30.0, f64::NAN, 32.0]),
                Column::new("ECMWF", vec![31.0, 31.0, 33.0]),
            ],
        )
        .unwrap()
        .with_mean(vec![30.5, 31.0, 32.5])
        .unwrap()
    }

    fn chart() -> ChartSpec {
        ChartSpec {
            title: "Temperature (F) Forecast for Albany<br>Updated: 20260115/0115 UTC".into(),
            legend_title: "Models".into(),
            file_name: "Albany_temperature_2m_forecast.html".into(),
            emphasis: LineEmphasis::EnsembleMean,
        }
    }

    #[test]
    fn traces_follow_columns_then_mean() {
        let fig = figure(&table(), &chart());
        let names: Vec<&str> = fig["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["GFS", "ECMWF", "Mean"]);
    }

    #[test]
    fn mean_trace_is_black_and_wide() {
        let fig = figure(&table(), &chart());
        let mean = &fig["data"][2];
        assert_eq!(mean["line"]["color"], "black");
        assert_eq!(mean["line"]["width"], 4);
        assert_eq!(mean["mode"], "markers+lines");
        assert!(fig["data"][0]["line"].as_object().unwrap().is_empty());
    }

    #[test]
    fn nan_values_become_null() {
        let fig = figure(&table(), &chart());
        assert!(fig["data"][0]["y"][1].is_null());
        assert_eq!(fig["data"][0]["y"][2], 32.0);
    }

    #[test]
    fn layout_matches_chart_conventions() {
        let fig = figure(&table(), &chart());
        let layout = &fig["layout"];
        assert_eq!(layout["hovermode"], "x unified");
        assert_eq!(layout["xaxis"]["dtick"], 43_200_000);
        assert_eq!(layout["xaxis"]["tickformat"], "%HZ\n%m-%d");
        assert_eq!(layout["xaxis"]["title"]["text"], "Time/Date (UTC)");
        assert_eq!(layout["legend"]["title"]["text"], "Models");
        assert_eq!(layout["title"]["x"], 0.5);
        assert_eq!(fig["data"][0]["x"][0], "2026-01-15 02:00:00");
    }

    #[test]
    fn precip_type_colours_applied() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 2, 0, 0).unwrap();
        let axis = TimeAxis::new(start, TimeDelta::hours(1), 1).unwrap();
        let table = ForecastTable::new(
            Variable::PrecipType,
            axis,
            vec![
                Column::new("Snow", vec![50.0]),
                Column::new("Rain", vec![50.0]),
                Column::new("Ice", vec![0.0]),
            ],
        )
        .unwrap();
        let chart = ChartSpec {
            emphasis: LineEmphasis::PrecipType,
            legend_title: "Precip Type".into(),
            ..chart()
        };
        let fig = figure(&table, &chart);
        assert_eq!(fig["data"][0]["line"]["color"], "blue");
        assert_eq!(fig["data"][1]["line"]["color"], "green");
        assert_eq!(fig["data"][2]["line"]["color"], "purple");
        assert_eq!(fig["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn page_embeds_figure_and_escapes_title() {
        let renderer = PlotlyRenderer::new(".", "https://cdn.plot.ly/plotly.min.js").unwrap();
        let page = renderer.render_page(&table(), &chart()).unwrap();
        assert!(page.contains("Plotly.newPlot(\"temperature_2m\""));
        assert!(page.contains("\"hovermode\":\"x unified\""));
        assert!(page.contains("<title>Temperature (F) Forecast for Albany - Updated"));
        assert!(!page.contains("<title>Temperature (F) Forecast for Albany<br>"));
    }

    #[tokio::test]
    async fn render_writes_file_named_by_chart() {
        let dir = TempDir::new().unwrap();
        let renderer = PlotlyRenderer::new(dir.path(), "plotly.js").unwrap();

        let path = renderer.render(&table(), &chart()).await.unwrap();

        assert_eq!(path, dir.path().join("Albany_temperature_2m_forecast.html"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
