//! Forecast models and the regional model sets
//!
//! Column order in every table follows [`ModelSet`] order. Which models are
//! queried depends on the [`Region`] a location falls in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::DomainError;
use crate::value_objects::GeoLocation;

/// Display name of the bias-corrected blend, excluded from ensemble means
pub const BIAS_CORRECTED_DISPLAY_NAME: &str = "NBM";

/// A numerical weather prediction model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Model {
    id: &'static str,
    display_name: &'static str,
}

impl Model {
    /// Create a model from its source identifier and chart label
    #[must_use]
    pub const fn new(id: &'static str, display_name: &'static str) -> Self {
        Self { id, display_name }
    }

    /// Identifier used by the data source
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Label used for table columns and chart legends
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.display_name
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.id)
    }
}

const ECMWF: Model = Model::new("ecmwf_ifs025", "ECMWF");
const ECMWF_AI: Model = Model::new("ecmwf_aifs025", "ECMWF-AI");
const GFS: Model = Model::new("gfs_global", "GFS");
const HRRR: Model = Model::new("gfs_hrrr", "HRRR");
const GRAPHCAST: Model = Model::new("gfs_graphcast025", "Google-AI");
const NBM: Model = Model::new("ncep_nbm_conus", BIAS_CORRECTED_DISPLAY_NAME);
const JMA: Model = Model::new("jma_seamless", "JMA");
const ICON: Model = Model::new("icon_seamless", "ICON");
const GEM: Model = Model::new("gem_seamless", "GEM");
const ARPEGE: Model = Model::new("meteofrance_arpege_world", "ARPEGE");
const UKMET: Model = Model::new("ukmo_seamless", "UKMET");

const CONUS_MODELS: [Model; 11] = [
    ECMWF, ECMWF_AI, GFS, HRRR, GRAPHCAST, NBM, JMA, ICON, GEM, ARPEGE, UKMET,
];

const GLOBAL_MODELS: [Model; 9] = [
    ECMWF, ECMWF_AI, GFS, GRAPHCAST, JMA, ICON, GEM, ARPEGE, UKMET,
];

/// Ordered, non-empty list of models with unique display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    models: Vec<Model>,
}

impl ModelSet {
    /// Create a model set
    ///
    /// # Errors
    ///
    /// Returns `EmptyModelSet` for an empty list and `DuplicateModel` if two
    /// models share a display name.
    pub fn new(models: Vec<Model>) -> Result<Self, DomainError> {
        if models.is_empty() {
            return Err(DomainError::EmptyModelSet);
        }
        let mut seen = HashSet::with_capacity(models.len());
        for model in &models {
            if !seen.insert(model.display_name()) {
                return Err(DomainError::DuplicateModel(model.display_name().to_string()));
            }
        }
        Ok(Self { models })
    }

    /// Models in column order
    #[must_use]
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Number of models
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate over the models in order
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Source identifiers in order
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.models.iter().map(Model::id)
    }

    /// Display names in order
    pub fn display_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.models.iter().map(Model::display_name)
    }

    /// Whether a model with this display name is in the set
    #[must_use]
    pub fn contains(&self, display_name: &str) -> bool {
        self.models.iter().any(|m| m.display_name() == display_name)
    }

    /// Set without the models rejected by `drop`
    ///
    /// # Errors
    ///
    /// Returns `EmptyModelSet` if nothing remains.
    pub fn without<F>(&self, mut drop: F) -> Result<Self, DomainError>
    where
        F: FnMut(&Model) -> bool,
    {
        let kept: Vec<Model> = self.models.iter().copied().filter(|m| !drop(m)).collect();
        Self::new(kept)
    }
}

impl<'a> IntoIterator for &'a ModelSet {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

/// Geographic region selecting the model set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Contiguous United States, covered by HRRR and NBM
    Conus,
    /// Anywhere else
    Global,
}

/// Latitude/longitude bounding box, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lon: f64,
    /// Eastern edge
    pub max_lon: f64,
}

impl BoundingBox {
    /// Whether the location lies inside the box
    #[must_use]
    pub fn contains(&self, location: &GeoLocation) -> bool {
        (self.min_lat..=self.max_lat).contains(&location.latitude())
            && (self.min_lon..=self.max_lon).contains(&location.longitude())
    }
}

const CONUS_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 24.0,
    max_lat: 50.0,
    min_lon: -125.0,
    max_lon: -62.0,
};

impl Region {
    /// Region a location falls in
    #[must_use]
    pub fn for_location(location: &GeoLocation) -> Self {
        [Self::Conus]
            .into_iter()
            .find(|region| region.bounds().is_some_and(|b| b.contains(location)))
            .unwrap_or(Self::Global)
    }

    /// Bounding box, `None` for the catch-all region
    #[must_use]
    pub const fn bounds(self) -> Option<BoundingBox> {
        match self {
            Self::Conus => Some(CONUS_BOUNDS),
            Self::Global => None,
        }
    }

    /// Models queried in this region
    #[must_use]
    pub fn models(self) -> ModelSet {
        let models = match self {
            Self::Conus => CONUS_MODELS.to_vec(),
            Self::Global => GLOBAL_MODELS.to_vec(),
        };
        ModelSet { models }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conus => write!(f, "CONUS"),
            Self::Global => write!(f, "Global"),
        }
    }
}
