//! Helper functions for materials
//!
//! Elastic constant conversions and property range checks shared by material models.

/// Elastic constant conversions
pub mod physics {
    use crate::math::Real;

    #[inline]
    pub fn shear_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (2.0 * (1.0 + poisson_ratio))
    }

    #[inline]
    pub fn bulk_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (3.0 * (1.0 - 2.0 * poisson_ratio))
    }
}

/// Check if material properties make sense
pub mod check {
    use crate::math::Real;

    #[inline]
    pub fn density_ok(density: Real) -> bool {
        density > 0.0 && density < 50000.0 && density.is_finite()
    }

    #[inline]
    pub fn young_modulus_ok(e: Real) -> bool {
        e > 0.0 && e < 1e12 && e.is_finite()
    }

    /// Open interval (-1, 0.5): at 0.5 the bulk modulus is unbounded
    #[inline]
    pub fn poisson_ratio_ok(nu: Real) -> bool {
        nu > -1.0 && nu < 0.5 && nu.is_finite()
    }
}
