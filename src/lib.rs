//! Background mesh for Material Point Method solvers
//!
//! Cells locate particles, invert the isoparametric map and move particle
//! state onto mesh nodes and back. The mesh owns nodes, cells and particles
//! and addresses them by id.

use bevy::prelude::{App, Plugin, PreUpdate};

pub mod config;
pub mod core;
pub mod error;
pub mod materials;
pub mod math;
pub mod shapefn;

pub use config::LocateParams;
pub use crate::core::{
    Cell, LocalCoordinates, LocateReport, Mesh, NodalPhase, Node, NodeBase, Particle,
    ParticleBase, Registry, locate_particles_system,
};
pub use error::{CellError, CellResult, MaterialError, MaterialResult};
pub use materials::{LinearElastic, Material, MaterialProperties, MaterialRegistry};
pub use math::{Index, Real, Vector, VoigtStress};
pub use shapefn::ShapeFn;

/// Re-locates the particles of the `Mesh<DIM>` resource before every update.
pub struct LocatePlugin<const DIM: usize>;

impl<const DIM: usize> Plugin for LocatePlugin<DIM> {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, locate_particles_system::<DIM>);
    }
}
