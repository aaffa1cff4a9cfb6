//! Background mesh nodes
//!
//! Nodes accumulate per-phase mass, volume, momentum and forces scattered by
//! every cell that shares them, and hold the velocity / acceleration that
//! cells gather back onto particles.

use crate::config::MASS_TOLERANCE;
use crate::math::{Index, Real, Vector, zero_vector};

/// Node state consumed by the cell transfer kernels.
///
/// `update_*` methods add to the stored value; phase indices are checked by
/// the caller against [`NodeBase::nphases`].
pub trait NodeBase<const DIM: usize>: Send + Sync + 'static {
    fn id(&self) -> Index;
    fn coordinates(&self) -> Vector<DIM>;
    fn assign_coordinates(&mut self, coordinates: Vector<DIM>);
    fn nphases(&self) -> usize;

    /// Reset every accumulator of every phase to zero
    fn initialise(&mut self);

    fn update_mass(&mut self, phase: usize, mass: Real);
    fn update_volume(&mut self, phase: usize, volume: Real);
    fn update_momentum(&mut self, phase: usize, momentum: &Vector<DIM>);
    fn update_external_force(&mut self, phase: usize, force: &Vector<DIM>);
    fn update_internal_force(&mut self, phase: usize, force: &Vector<DIM>);

    fn mass(&self, phase: usize) -> Real;
    fn volume(&self, phase: usize) -> Real;
    fn momentum(&self, phase: usize) -> Vector<DIM>;
    fn external_force(&self, phase: usize) -> Vector<DIM>;
    fn internal_force(&self, phase: usize) -> Vector<DIM>;
    fn velocity(&self, phase: usize) -> Vector<DIM>;
    fn acceleration(&self, phase: usize) -> Vector<DIM>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodalPhase<const DIM: usize> {
    pub mass: Real,
    pub volume: Real,
    pub momentum: Vector<DIM>,
    pub external_force: Vector<DIM>,
    pub internal_force: Vector<DIM>,
    pub velocity: Vector<DIM>,
    pub acceleration: Vector<DIM>,
}

impl<const DIM: usize> NodalPhase<DIM> {
    #[inline(always)]
    pub fn zeroed() -> Self {
        Self {
            mass: 0.0,
            volume: 0.0,
            momentum: zero_vector(),
            external_force: zero_vector(),
            internal_force: zero_vector(),
            velocity: zero_vector(),
            acceleration: zero_vector(),
        }
    }
}

impl<const DIM: usize> Default for NodalPhase<DIM> {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[derive(Clone, Debug)]
pub struct Node<const DIM: usize> {
    id: Index,
    coordinates: Vector<DIM>,
    phases: Vec<NodalPhase<DIM>>,
}

impl<const DIM: usize> Node<DIM> {
    /// Single-phase node
    pub fn new(id: Index, coordinates: Vector<DIM>) -> Self {
        Self::with_phases(id, coordinates, 1)
    }

    pub fn with_phases(id: Index, coordinates: Vector<DIM>, nphases: usize) -> Self {
        Self {
            id,
            coordinates,
            phases: vec![NodalPhase::zeroed(); nphases],
        }
    }

    pub fn phase(&self, phase: usize) -> Option<&NodalPhase<DIM>> {
        self.phases.get(phase)
    }

    /// Velocity from the accumulated momentum; stays zero on a massless node.
    pub fn compute_velocity(&mut self, phase: usize) {
        let state = &mut self.phases[phase];
        if state.mass > MASS_TOLERANCE {
            state.velocity = state.momentum / state.mass;
        }
    }

    /// Acceleration from the total nodal force, then an explicit velocity update.
    pub fn compute_acceleration_velocity(&mut self, phase: usize, dt: Real) {
        let state = &mut self.phases[phase];
        if state.mass > MASS_TOLERANCE {
            state.acceleration = (state.external_force + state.internal_force) / state.mass;
            state.velocity += state.acceleration * dt;
        }
    }
}

impl<const DIM: usize> NodeBase<DIM> for Node<DIM> {
    fn id(&self) -> Index {
        self.id
    }

    fn coordinates(&self) -> Vector<DIM> {
        self.coordinates
    }

    fn assign_coordinates(&mut self, coordinates: Vector<DIM>) {
        self.coordinates = coordinates;
    }

    fn nphases(&self) -> usize {
        self.phases.len()
    }

    fn initialise(&mut self) {
        self.phases.fill(NodalPhase::zeroed());
    }

    #[inline(always)]
    fn update_mass(&mut self, phase: usize, mass: Real) {
        self.phases[phase].mass += mass;
    }

    #[inline(always)]
    fn update_volume(&mut self, phase: usize, volume: Real) {
        self.phases[phase].volume += volume;
    }

    #[inline(always)]
    fn update_momentum(&mut self, phase: usize, momentum: &Vector<DIM>) {
        self.phases[phase].momentum += momentum;
    }

    #[inline(always)]
    fn update_external_force(&mut self, phase: usize, force: &Vector<DIM>) {
        self.phases[phase].external_force += force;
    }

    #[inline(always)]
    fn update_internal_force(&mut self, phase: usize, force: &Vector<DIM>) {
        self.phases[phase].internal_force += force;
    }

    fn mass(&self, phase: usize) -> Real {
        self.phases[phase].mass
    }

    fn volume(&self, phase: usize) -> Real {
        self.phases[phase].volume
    }

    fn momentum(&self, phase: usize) -> Vector<DIM> {
        self.phases[phase].momentum
    }

    fn external_force(&self, phase: usize) -> Vector<DIM> {
        self.phases[phase].external_force
    }

    fn internal_force(&self, phase: usize) -> Vector<DIM> {
        self.phases[phase].internal_force
    }

    fn velocity(&self, phase: usize) -> Vector<DIM> {
        self.phases[phase].velocity
    }

    fn acceleration(&self, phase: usize) -> Vector<DIM> {
        self.phases[phase].acceleration
    }
}
