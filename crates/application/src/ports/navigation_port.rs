//! Navigation page port

use std::path::PathBuf;

use async_trait::async_trait;
use domain::value_objects::LocationName;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of writing the navigation page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Page written to the given path
    Written(PathBuf),
    /// Template not found; nothing was written
    TemplateMissing(PathBuf),
}

/// Port for generating the per-location navigation page
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NavigationPort: Send + Sync {
    /// Write the navigation page linking a location's charts
    ///
    /// A missing template is reported through [`NavigationOutcome`], not as
    /// an error.
    async fn write_navigation(
        &self,
        location: &LocationName,
    ) -> Result<NavigationOutcome, ApplicationError>;
}
