//! Hexahedral elements on the reference cube [-1, 1]^3
//!
//! Corners 0-3 lie on the face zeta = -1 and 4-7 on zeta = 1, both counted
//! counter-clockwise from (-1, -1). Nodes 8-19 of the serendipity element are
//! the edge midpoints.

use nalgebra::{DMatrix, DVector};

use crate::math::Real;

pub const NODES: [[Real; 3]; 20] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    // edge midpoints: 0-1, 0-3, 0-4, 1-2, 1-5, 2-3, 2-6, 3-7, 4-5, 4-7, 5-6, 6-7
    [0.0, -1.0, -1.0],
    [-1.0, 0.0, -1.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, -1.0],
    [1.0, -1.0, 0.0],
    [0.0, 1.0, -1.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [0.0, -1.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];

pub const CORNERS: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

// Two triangles per face, wound counter-clockwise seen from outside
pub const FACE_TRIANGLES: [usize; 36] = [
    0, 3, 2, 0, 2, 1, // zeta = -1
    4, 5, 6, 4, 6, 7, // zeta = 1
    0, 1, 5, 0, 5, 4, // eta = -1
    3, 7, 6, 3, 6, 2, // eta = 1
    0, 4, 7, 0, 7, 3, // xi = -1
    1, 2, 6, 1, 6, 5, // xi = 1
];

/// Product of the linear factors (1 + x_j n_j) over every axis except `skip`.
#[inline(always)]
fn linear_product(xi: &[Real], node: &[Real; 3], skip: &[usize]) -> Real {
    (0..3)
        .filter(|axis| !skip.contains(axis))
        .map(|axis| 1.0 + xi[axis] * node[axis])
        .product()
}

pub fn trilinear(xi: &[Real]) -> DVector<Real> {
    DVector::from_fn(8, |i, _| 0.125 * linear_product(xi, &NODES[i], &[]))
}

pub fn grad_trilinear(xi: &[Real]) -> DMatrix<Real> {
    DMatrix::from_fn(8, 3, |i, axis| {
        let node = &NODES[i];
        0.125 * node[axis] * linear_product(xi, node, &[axis])
    })
}

fn serendipity_eval(xi: &[Real]) -> (DVector<Real>, DMatrix<Real>) {
    let mut values = DVector::zeros(20);
    let mut grad = DMatrix::zeros(20, 3);
    for (i, node) in NODES.iter().enumerate() {
        match node.iter().position(|&n| n == 0.0) {
            None => {
                let sum: Real = (0..3).map(|axis| xi[axis] * node[axis]).sum();
                values[i] = 0.125 * linear_product(xi, node, &[]) * (sum - 2.0);
                for axis in 0..3 {
                    grad[(i, axis)] = 0.125
                        * node[axis]
                        * linear_product(xi, node, &[axis])
                        * (sum + xi[axis] * node[axis] - 1.0);
                }
            }
            Some(mid) => {
                let bubble = 1.0 - xi[mid] * xi[mid];
                values[i] = 0.25 * bubble * linear_product(xi, node, &[mid]);
                for axis in 0..3 {
                    grad[(i, axis)] = if axis == mid {
                        -0.5 * xi[mid] * linear_product(xi, node, &[mid])
                    } else {
                        0.25 * bubble * node[axis] * linear_product(xi, node, &[mid, axis])
                    };
                }
            }
        }
    }
    (values, grad)
}

pub fn serendipity(xi: &[Real]) -> DVector<Real> {
    serendipity_eval(xi).0
}

pub fn grad_serendipity(xi: &[Real]) -> DMatrix<Real> {
    serendipity_eval(xi).1
}
