//! Material contract and the name -> constructor registry

use indexmap::IndexMap;

use crate::error::{MaterialError, MaterialResult};
use crate::math::{Index, Real, VoigtStress};

use super::linear_elastic::LinearElastic;

/// Named scalar material properties, as read from an input deck
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialProperties {
    values: IndexMap<String, Real>,
}

impl MaterialProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: Real) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> MaterialResult<Real> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| MaterialError::MissingProperty(name.to_string()))
    }
}

/// Constitutive model evaluated per particle.
pub trait Material: Send + Sync {
    fn id(&self) -> Index;
    fn name(&self) -> &'static str;
    fn density(&self) -> Real;

    /// Read and validate properties; the model is unchanged on error.
    fn properties(&mut self, properties: &MaterialProperties) -> MaterialResult<()>;

    /// Stress after applying the strain increment `dstrain` (Voigt, engineering shear)
    fn compute_stress(&self, stress: &VoigtStress, dstrain: &VoigtStress) -> VoigtStress;
}

pub type MaterialConstructor = fn(Index) -> Box<dyn Material>;

/// Explicit registry of material models, built and owned by the driver.
#[derive(Clone, Debug, Default)]
pub struct MaterialRegistry {
    models: IndexMap<String, MaterialConstructor>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_models() -> Self {
        let mut registry = Self::new();
        registry.register("LinearElastic", |id| Box::new(LinearElastic::new(id)));
        registry
    }

    /// Register a constructor; fails if the name is taken.
    pub fn register(&mut self, name: &str, constructor: MaterialConstructor) -> bool {
        if self.models.contains_key(name) {
            return false;
        }
        self.models.insert(name.to_string(), constructor);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str, id: Index) -> MaterialResult<Box<dyn Material>> {
        self.models
            .get(name)
            .map(|constructor| constructor(id))
            .ok_or_else(|| MaterialError::UnknownModel(name.to_string()))
    }

    /// Create a model and load its properties in one step.
    pub fn create_with(
        &self,
        name: &str,
        id: Index,
        properties: &MaterialProperties,
    ) -> MaterialResult<Box<dyn Material>> {
        let mut material = self.create(name, id)?;
        material.properties(properties)?;
        Ok(material)
    }
}
