//! Location label value object
//!
//! The label is shown in chart titles as given and is turned into a
//! filesystem-friendly prefix for every generated file.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::LocationName;
//!
//! let name = LocationName::new("Saratoga Springs, NY").expect("valid name");
//! assert_eq!(name.as_str(), "Saratoga Springs, NY");
//! assert_eq!(name.file_stem(), "Saratoga_Springs_NY");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Human-readable name of a forecast point
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationName(String);

impl LocationName {
    /// Create a location name
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "location name must not be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the label as given
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix used for generated file names
    ///
    /// Spaces and commas become underscores, then one pass collapses
    /// doubled underscores.
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.0.replace([' ', ','], "_").replace("__", "_")
    }

    /// File name of a chart for the given variable slug
    #[must_use]
    pub fn chart_file_name(&self, slug: &str) -> String {
        format!("{}_{slug}_forecast.html", self.file_stem())
    }

    /// File name of the navigation page
    #[must_use]
    pub fn navigation_file_name(&self) -> String {
        format!("{}_forecast.html", self.file_stem())
    }
}

impl Default for LocationName {
    fn default() -> Self {
        Self("Albany".to_string())
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
