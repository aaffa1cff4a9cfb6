//! Isotropic linear elasticity

use bevy::log::debug;
use nalgebra::SMatrix;

use crate::error::{MaterialError, MaterialResult};
use crate::math::{Index, Real, VoigtStress};

use super::material_types::{Material, MaterialProperties};
use super::utils::{check, physics};

pub type ElasticTensor = SMatrix<Real, 6, 6>;

#[derive(Clone, Debug, PartialEq)]
pub struct LinearElastic {
    id: Index,
    density: Real,
    youngs_modulus: Real,
    poisson_ratio: Real,
    elastic_tensor: ElasticTensor,
}

impl LinearElastic {
    /// Unloaded model: zero stiffness until properties are read
    pub fn new(id: Index) -> Self {
        Self {
            id,
            density: 0.0,
            youngs_modulus: 0.0,
            poisson_ratio: 0.0,
            elastic_tensor: ElasticTensor::zeros(),
        }
    }

    pub fn with_properties(id: Index, properties: &MaterialProperties) -> MaterialResult<Self> {
        let mut material = Self::new(id);
        material.properties(properties)?;
        Ok(material)
    }

    pub fn youngs_modulus(&self) -> Real {
        self.youngs_modulus
    }

    pub fn poisson_ratio(&self) -> Real {
        self.poisson_ratio
    }

    pub fn elastic_tensor(&self) -> &ElasticTensor {
        &self.elastic_tensor
    }

    fn compute_elastic_tensor(youngs_modulus: Real, poisson_ratio: Real) -> ElasticTensor {
        let bulk = physics::bulk_modulus(youngs_modulus, poisson_ratio);
        let shear = physics::shear_modulus(youngs_modulus, poisson_ratio);
        let a1 = bulk + 4.0 / 3.0 * shear;
        let a2 = bulk - 2.0 / 3.0 * shear;

        let mut de = ElasticTensor::zeros();
        for i in 0..3 {
            for j in 0..3 {
                de[(i, j)] = if i == j { a1 } else { a2 };
            }
            de[(i + 3, i + 3)] = shear;
        }
        de
    }
}

fn validated(properties: &MaterialProperties, name: &str, ok: fn(Real) -> bool) -> MaterialResult<Real> {
    let value = properties.get(name)?;
    if !ok(value) {
        return Err(MaterialError::InvalidProperty {
            name: name.to_string(),
            value,
        });
    }
    Ok(value)
}

impl Material for LinearElastic {
    fn id(&self) -> Index {
        self.id
    }

    fn name(&self) -> &'static str {
        "LinearElastic"
    }

    fn density(&self) -> Real {
        self.density
    }

    fn properties(&mut self, properties: &MaterialProperties) -> MaterialResult<()> {
        let density = validated(properties, "density", check::density_ok)?;
        let youngs_modulus = validated(properties, "youngs_modulus", check::young_modulus_ok)?;
        let poisson_ratio = validated(properties, "poisson_ratio", check::poisson_ratio_ok)?;

        self.density = density;
        self.youngs_modulus = youngs_modulus;
        self.poisson_ratio = poisson_ratio;
        self.elastic_tensor = Self::compute_elastic_tensor(youngs_modulus, poisson_ratio);
        debug!(
            "material {}: LinearElastic E = {:.3e}, nu = {}",
            self.id, youngs_modulus, poisson_ratio
        );
        Ok(())
    }

    fn compute_stress(&self, stress: &VoigtStress, dstrain: &VoigtStress) -> VoigtStress {
        stress + self.elastic_tensor * dstrain
    }
}
