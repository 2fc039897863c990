//! Domain layer for the meteogram generator
//!
//! Contains the forecast tables, model sets, variables and the pure
//! transformation rules that turn raw model output into finished charts.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod transform;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
