//! Output, publishing and logging configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where and how generated files are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving charts and the navigation page (default: .)
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Navigation template file name, relative to `directory`
    #[serde(default = "default_navigation_template")]
    pub navigation_template: String,

    /// Token in the template replaced by the location file stem
    #[serde(default = "default_navigation_token")]
    pub navigation_token: String,

    /// Script URL for the plotting library loaded by every chart page
    #[serde(default = "default_plotly_js_url")]
    pub plotly_js_url: String,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_navigation_template() -> String {
    "Template_forecast.html".to_string()
}

fn default_navigation_token() -> String {
    "Template".to_string()
}

fn default_plotly_js_url() -> String {
    "https://cdn.plot.ly/plotly-2.35.2.min.js".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            navigation_template: default_navigation_template(),
            navigation_token: default_navigation_token(),
            plotly_js_url: default_plotly_js_url(),
        }
    }
}

impl OutputConfig {
    /// Full path of the navigation template
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.directory.join(&self.navigation_template)
    }
}

/// Git publishing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Remote to pull from and push to (default: origin)
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch checked out before committing (default: master)
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Repository working tree; the output directory when unset
    #[serde(default)]
    pub repository: Option<PathBuf>,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            branch: default_branch(),
            repository: None,
        }
    }
}

impl PublishConfig {
    /// Working tree used for git commands
    #[must_use]
    pub fn repository_or<'a>(&'a self, output_directory: &'a Path) -> &'a Path {
        self.repository.as_deref().unwrap_or(output_directory)
    }
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Filter directive used when neither `RUST_LOG` nor `-v` is given
    #[serde(default)]
    pub level: Option<String>,
}
