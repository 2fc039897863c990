//! Chart rendering port
//!
//! A [`ChartSpec`] carries everything about a chart that is not data: title,
//! legend heading, output file name and per-line styling. Renderers only
//! decide how to draw it.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::{ForecastTable, MEAN_COLUMN, Variable};
use domain::value_objects::LocationName;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Format of the "Updated" stamp in chart titles
pub const UPDATED_FORMAT: &str = "%Y%m%d/%H%M UTC";

/// Width (px) of the ensemble mean line
pub const MEAN_LINE_WIDTH: u8 = 4;

/// Colour and width overrides for one line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStyle {
    /// CSS colour, `None` for the renderer's palette
    pub color: Option<&'static str>,
    /// Line width in px, `None` for the default
    pub width: Option<u8>,
}

/// How lines of a chart are emphasized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEmphasis {
    /// One line per model, the ensemble mean drawn black and wide
    EnsembleMean,
    /// One line per precipitation type, fixed colours
    PrecipType,
}

impl LineEmphasis {
    /// Style for the line with the given column label
    #[must_use]
    pub fn style_for(self, column: &str) -> LineStyle {
        match (self, column) {
            (Self::EnsembleMean, MEAN_COLUMN) => LineStyle {
                color: Some("black"),
                width: Some(MEAN_LINE_WIDTH),
            },
            (Self::PrecipType, "Snow") => LineStyle {
                color: Some("blue"),
                width: None,
            },
            (Self::PrecipType, "Rain") => LineStyle {
                color: Some("green"),
                width: None,
            },
            (Self::PrecipType, "Ice") => LineStyle {
                color: Some("purple"),
                width: None,
            },
            _ => LineStyle::default(),
        }
    }
}

/// Non-data description of one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    /// Title, may contain `<br>`
    pub title: String,
    /// Legend heading
    pub legend_title: String,
    /// Output file name, relative to the output directory
    pub file_name: String,
    /// Line styling rule
    pub emphasis: LineEmphasis,
}

impl ChartSpec {
    /// Chart description for a finished table
    #[must_use]
    pub fn for_table(
        table: &ForecastTable,
        location: &LocationName,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let variable = table.variable();
        let (legend_title, emphasis) = if variable == Variable::PrecipType {
            ("Precip Type", LineEmphasis::PrecipType)
        } else {
            ("Models", LineEmphasis::EnsembleMean)
        };
        Self {
            title: format!(
                "{} Forecast for {location}<br>Updated: {}",
                variable.title(),
                updated_at.format(UPDATED_FORMAT)
            ),
            legend_title: legend_title.to_string(),
            file_name: location.chart_file_name(variable.id()),
            emphasis,
        }
    }

    /// Style for the line with the given column label
    #[must_use]
    pub fn line_style(&self, column: &str) -> LineStyle {
        self.emphasis.style_for(column)
    }
}

/// Port for writing chart files
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChartRendererPort: Send + Sync {
    /// Render a table and return the path of the written file
    async fn render(
        &self,
        table: &ForecastTable,
        chart: &ChartSpec,
    ) -> Result<PathBuf, ApplicationError>;
}
