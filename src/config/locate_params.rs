use crate::math::Real;

use super::constants::{CONTAINMENT_TOLERANCE, NEWTON_MAX_ITERATIONS, NEWTON_TOLERANCE};

/// Parameters controlling point containment and particle localization
#[derive(Clone, Debug, PartialEq)]
pub struct LocateParams {
    /// Relative tolerance between the point-apex sub-volume sum and the cell volume
    pub containment_tolerance: Real,

    /// Step norm below which the local coordinate inversion is converged
    pub newton_tolerance: Real,

    /// Iteration cap of the local coordinate inversion
    pub newton_max_iterations: usize,

    /// Test the particle's previous cell and its neighbours before scanning every cell
    pub neighbour_fast_path: bool,
}

impl Default for LocateParams {
    fn default() -> Self {
        Self {
            containment_tolerance: CONTAINMENT_TOLERANCE,
            newton_tolerance: NEWTON_TOLERANCE,
            newton_max_iterations: NEWTON_MAX_ITERATIONS,
            neighbour_fast_path: true,
        }
    }
}

impl LocateParams {
    pub fn with_containment_tolerance(mut self, tolerance: Real) -> Self {
        self.containment_tolerance = tolerance.abs();
        self
    }

    pub fn with_newton_tolerance(mut self, tolerance: Real) -> Self {
        self.newton_tolerance = tolerance.abs();
        self
    }

    /// Set the iteration cap (at least one iteration is always run)
    pub fn with_newton_max_iterations(mut self, iterations: usize) -> Self {
        self.newton_max_iterations = iterations.max(1);
        self
    }

    /// Always scan every cell in registration order
    pub fn without_neighbour_fast_path(mut self) -> Self {
        self.neighbour_fast_path = false;
        self
    }
}
