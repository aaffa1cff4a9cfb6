// Numerical tolerances for the cell geometry and node kernels
use crate::math::Real;

// Relative tolerance between the point-apex sub-volume sum and the cell volume
pub const CONTAINMENT_TOLERANCE: Real = 1e-9;

// Local coordinate inversion (Newton-Raphson)
pub const NEWTON_TOLERANCE: Real = 1e-10;
pub const NEWTON_MAX_ITERATIONS: usize = 20;

// Nodal mass below which velocity and acceleration are left at zero
pub const MASS_TOLERANCE: Real = 1e-15;
