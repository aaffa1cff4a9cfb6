//! Linear simplex elements on the unit triangle / tetrahedron.

use nalgebra::{DMatrix, DVector};

use crate::math::Real;

pub const TRIANGLE_NODES: [[Real; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
pub const TRIANGLE_CORNERS: [usize; 3] = [0, 1, 2];
pub const TRIANGLE_EDGES: [usize; 6] = [0, 1, 1, 2, 2, 0];

pub const TETRAHEDRON_NODES: [[Real; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];
pub const TETRAHEDRON_CORNERS: [usize; 4] = [0, 1, 2, 3];
pub const TETRAHEDRON_FACES: [usize; 12] = [0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3];

/// Barycentric weights: the first node takes the remainder.
fn barycentric(xi: &[Real], dim: usize) -> DVector<Real> {
    let mut values = DVector::zeros(dim + 1);
    values[0] = 1.0 - xi[..dim].iter().sum::<Real>();
    for axis in 0..dim {
        values[axis + 1] = xi[axis];
    }
    values
}

fn grad_barycentric(dim: usize) -> DMatrix<Real> {
    DMatrix::from_fn(dim + 1, dim, |i, axis| match i {
        0 => -1.0,
        _ if i == axis + 1 => 1.0,
        _ => 0.0,
    })
}

pub fn triangle(xi: &[Real]) -> DVector<Real> {
    barycentric(xi, 2)
}

pub fn grad_triangle(_xi: &[Real]) -> DMatrix<Real> {
    grad_barycentric(2)
}

pub fn tetrahedron(xi: &[Real]) -> DVector<Real> {
    barycentric(xi, 3)
}

pub fn grad_tetrahedron(_xi: &[Real]) -> DMatrix<Real> {
    grad_barycentric(3)
}
