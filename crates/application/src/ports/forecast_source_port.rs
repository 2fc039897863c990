//! Forecast source port
//!
//! Defines the interface for fetching raw multi-model forecast data.

use async_trait::async_trait;
use domain::entities::{ModelSet, RawForecast, Variable};
use domain::value_objects::GeoLocation;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// What to fetch in one run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Forecast point
    pub location: GeoLocation,
    /// Models to query, in column order
    pub models: ModelSet,
    /// Variables to query, in request order
    pub variables: Vec<Variable>,
}

impl ForecastRequest {
    /// Request every fetched variable for a model set
    #[must_use]
    pub fn all_variables(location: GeoLocation, models: ModelSet) -> Self {
        Self {
            location,
            models,
            variables: Variable::FETCHED.to_vec(),
        }
    }
}

/// Port for forecast data retrieval
///
/// A fetch is atomic: it either returns every requested series it could get
/// on one shared time axis or fails.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastSourcePort: Send + Sync {
    /// Fetch hourly series for every requested (variable, model) pair
    async fn fetch(&self, request: &ForecastRequest) -> Result<RawForecast, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::entities::Region;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ForecastSourcePort>();
    }

    #[test]
    fn all_variables_requests_fetched_set() {
        let request =
            ForecastRequest::all_variables(GeoLocation::albany(), Region::Conus.models());
        assert_eq!(request.variables.len(), 9);
        assert_eq!(request.variables[0], Variable::Temperature2m);
        assert_eq!(request.models.len(), 11);
    }
}
