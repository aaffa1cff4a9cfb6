//! Material points
//!
//! Particles carry coordinates, mass, volume, velocity and stress, and
//! remember which cell they were last located in.

use crate::math::{Index, Real, Vector, VoigtStress, zero_stress, zero_vector};

/// Particle state read and written by mesh localization.
pub trait ParticleBase<const DIM: usize>: Send + Sync + 'static {
    fn id(&self) -> Index;
    fn coordinates(&self) -> Vector<DIM>;
    fn assign_coordinates(&mut self, coordinates: Vector<DIM>);

    /// Owning cell, `None` while unlocated
    fn cell_id(&self) -> Option<Index>;

    /// Local coordinates inside the owning cell
    fn local_coordinates(&self) -> Option<Vector<DIM>>;

    fn assign_cell(&mut self, cell_id: Index, xi: Vector<DIM>);
    fn clear_cell(&mut self);

    fn is_located(&self) -> bool {
        self.cell_id().is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle<const DIM: usize> {
    id: Index,
    coordinates: Vector<DIM>,
    cell_id: Option<Index>,
    xi: Option<Vector<DIM>>,

    pub phase: usize,
    pub mass: Real,
    pub volume: Real,
    pub velocity: Vector<DIM>,
    pub acceleration: Vector<DIM>,
    pub stress: VoigtStress,
}

impl<const DIM: usize> Particle<DIM> {
    pub fn new(id: Index, coordinates: Vector<DIM>) -> Self {
        Self {
            id,
            coordinates,
            cell_id: None,
            xi: None,
            phase: 0,
            mass: 1.0,
            volume: 1.0,
            velocity: zero_vector(),
            acceleration: zero_vector(),
            stress: zero_stress(),
        }
    }

    pub fn with_phase(mut self, phase: usize) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_volume(mut self, volume: Real) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector<DIM>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_stress(mut self, stress: VoigtStress) -> Self {
        self.stress = stress;
        self
    }

    #[inline(always)]
    pub fn density(&self) -> Real {
        if self.volume > 0.0 {
            self.mass / self.volume
        } else {
            0.0
        }
    }
}

impl<const DIM: usize> ParticleBase<DIM> for Particle<DIM> {
    fn id(&self) -> Index {
        self.id
    }

    fn coordinates(&self) -> Vector<DIM> {
        self.coordinates
    }

    fn assign_coordinates(&mut self, coordinates: Vector<DIM>) {
        self.coordinates = coordinates;
    }

    fn cell_id(&self) -> Option<Index> {
        self.cell_id
    }

    fn local_coordinates(&self) -> Option<Vector<DIM>> {
        self.xi
    }

    fn assign_cell(&mut self, cell_id: Index, xi: Vector<DIM>) {
        self.cell_id = Some(cell_id);
        self.xi = Some(xi);
    }

    fn clear_cell(&mut self) {
        self.cell_id = None;
        self.xi = None;
    }
}
