//! Material models
//!
//! * `material_types` - the `Material` contract and the model registry
//! * `linear_elastic` - isotropic linear elasticity
//! * `utils` - elastic constant conversions and property checks

pub mod linear_elastic;
pub mod material_types;
pub mod utils;

pub use linear_elastic::{ElasticTensor, LinearElastic};
pub use material_types::{Material, MaterialConstructor, MaterialProperties, MaterialRegistry};

pub use utils::check;
pub use utils::physics;
