pub mod cell;
pub mod mesh;
pub mod node;
pub mod particle;
pub mod registry;

pub use cell::{Cell, LocalCoordinates};
pub use mesh::{LocateReport, Mesh, locate_particles_system};
pub use node::{NodalPhase, Node, NodeBase};
pub use particle::{Particle, ParticleBase};
pub use registry::Registry;
