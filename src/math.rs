use nalgebra::{DVector, SVector};

pub type Real = f64;

/// Global identifier of a node, cell, particle or mesh; also used for local slots.
pub type Index = usize;

pub type Vector<const DIM: usize> = SVector<Real, DIM>;

/// Stress / strain in Voigt order (xx, yy, zz, xy, yz, xz).
pub type VoigtStress = SVector<Real, 6>;

pub const VOIGT_SIZE: usize = 6;

#[inline(always)]
pub fn zero_vector<const DIM: usize>() -> Vector<DIM> {
    Vector::<DIM>::zeros()
}

#[inline(always)]
pub fn zero_stress() -> VoigtStress {
    VoigtStress::zeros()
}

/// Number of independent strain components for a dimension (3 in 2D, 6 in 3D).
#[inline(always)]
pub fn voigt_dof(dim: usize) -> usize {
    if dim == 2 { 3 } else { VOIGT_SIZE }
}

/// Components of a full Voigt stress that pair with the B-matrix rows of `dim`.
pub fn reduced_stress(stress: &VoigtStress, dim: usize) -> DVector<Real> {
    if dim == 2 {
        DVector::from_column_slice(&[stress[0], stress[1], stress[3]])
    } else {
        DVector::from_column_slice(stress.as_slice())
    }
}

#[inline(always)]
pub fn to_dvector<const DIM: usize>(v: &Vector<DIM>) -> DVector<Real> {
    DVector::from_column_slice(v.as_slice())
}

#[inline(always)]
pub fn from_dvector<const DIM: usize>(v: &DVector<Real>) -> Vector<DIM> {
    Vector::<DIM>::from_column_slice(v.as_slice())
}

/// Signed area of the triangle (apex, a, b); positive for counter-clockwise winding.
#[inline(always)]
pub fn triangle_area(apex: &[Real], a: &[Real], b: &[Real]) -> Real {
    let (ax, ay) = (a[0] - apex[0], a[1] - apex[1]);
    let (bx, by) = (b[0] - apex[0], b[1] - apex[1]);
    0.5 * (ax * by - ay * bx)
}

/// Signed volume of the tetrahedron (apex, a, b, c); positive when (a, b, c)
/// winds counter-clockwise seen from outside the apex.
#[inline(always)]
pub fn tetrahedron_volume(apex: &[Real], a: &[Real], b: &[Real], c: &[Real]) -> Real {
    let u = [a[0] - apex[0], a[1] - apex[1], a[2] - apex[2]];
    let v = [b[0] - apex[0], b[1] - apex[1], b[2] - apex[2]];
    let w = [c[0] - apex[0], c[1] - apex[1], c[2] - apex[2]];
    let cross = [
        v[1] * w[2] - v[2] * w[1],
        v[2] * w[0] - v[0] * w[2],
        v[0] * w[1] - v[1] * w[0],
    ];
    (u[0] * cross[0] + u[1] * cross[1] + u[2] * cross[2]) / 6.0
}
