//! Publishing port

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for pushing generated files to a remote
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PublisherPort: Send + Sync {
    /// Publish every generated file whose name starts with `file_stem`
    async fn publish(&self, file_stem: &str) -> Result<(), ApplicationError>;
}
