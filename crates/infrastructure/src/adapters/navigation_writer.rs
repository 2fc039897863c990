//! Navigation page writer - Implements NavigationPort from an HTML template

use std::io::ErrorKind;
use std::path::PathBuf;

use application::error::ApplicationError;
use application::ports::{NavigationOutcome, NavigationPort};
use async_trait::async_trait;
use domain::value_objects::LocationName;
use tracing::{debug, instrument};

/// Copies the navigation template, substituting the location file stem
#[derive(Debug, Clone)]
pub struct NavigationWriter {
    directory: PathBuf,
    template: PathBuf,
    token: String,
}

impl NavigationWriter {
    /// Create a writer
    ///
    /// `template` is read as given; output goes to `directory`.
    pub fn new(
        directory: impl Into<PathBuf>,
        template: impl Into<PathBuf>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            template: template.into(),
            token: token.into(),
        }
    }

    /// Replace every occurrence of the token
    #[must_use]
    pub fn substitute(&self, template: &str, location: &LocationName) -> String {
        template.replace(&self.token, &location.file_stem())
    }
}

#[async_trait]
impl NavigationPort for NavigationWriter {
    #[instrument(skip(self), fields(template = %self.template.display()))]
    async fn write_navigation(
        &self,
        location: &LocationName,
    ) -> Result<NavigationOutcome, ApplicationError> {
        let template = match tokio::fs::read_to_string(&self.template).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(NavigationOutcome::TemplateMissing(self.template.clone()));
            },
            Err(e) => {
                return Err(ApplicationError::Rendering(format!(
                    "{}: {e}",
                    self.template.display()
                )));
            },
        };

        let path = self.directory.join(location.navigation_file_name());
        tokio::fs::write(&path, self.substitute(&template, location))
            .await
            .map_err(|e| ApplicationError::Rendering(format!("{}: {e}", path.display())))?;

        debug!(path = %path.display(), "Navigation page written");
        Ok(NavigationOutcome::Written(path))
    }
}
