//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod location_name;
mod precision;

pub use geo_location::{GeoLocation, InvalidCoordinates};
pub use location_name::LocationName;
pub use precision::Precision;
