//! Quadrilateral elements on the reference square [-1, 1]^2
//!
//! Node numbering (4 / 8 / 9 nodes):
//!
//! ```text
//!   3 ---- 6 ---- 2
//!   |             |
//!   7      8      5
//!   |             |
//!   0 ---- 4 ---- 1
//! ```

use nalgebra::{DMatrix, DVector};

use crate::math::Real;

pub const NODES: [[Real; 2]; 9] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
    [0.0, -1.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [-1.0, 0.0],
    [0.0, 0.0],
];

pub const CORNERS: [usize; 4] = [0, 1, 2, 3];

// Counter-clockwise boundary edges
pub const EDGES: [usize; 8] = [0, 1, 1, 2, 2, 3, 3, 0];

pub fn bilinear(xi: &[Real]) -> DVector<Real> {
    DVector::from_fn(4, |i, _| {
        let [a, b] = NODES[i];
        0.25 * (1.0 + xi[0] * a) * (1.0 + xi[1] * b)
    })
}

pub fn grad_bilinear(xi: &[Real]) -> DMatrix<Real> {
    let mut grad = DMatrix::zeros(4, 2);
    for (i, &[a, b]) in NODES.iter().take(4).enumerate() {
        grad[(i, 0)] = 0.25 * a * (1.0 + xi[1] * b);
        grad[(i, 1)] = 0.25 * b * (1.0 + xi[0] * a);
    }
    grad
}

/// 8-node serendipity values and gradients in one pass.
fn serendipity_eval(xi: &[Real]) -> (DVector<Real>, DMatrix<Real>) {
    let (x, y) = (xi[0], xi[1]);
    let mut values = DVector::zeros(8);
    let mut grad = DMatrix::zeros(8, 2);
    for (i, &[a, b]) in NODES.iter().take(8).enumerate() {
        if a == 0.0 {
            values[i] = 0.5 * (1.0 - x * x) * (1.0 + y * b);
            grad[(i, 0)] = -x * (1.0 + y * b);
            grad[(i, 1)] = 0.5 * (1.0 - x * x) * b;
        } else if b == 0.0 {
            values[i] = 0.5 * (1.0 + x * a) * (1.0 - y * y);
            grad[(i, 0)] = 0.5 * a * (1.0 - y * y);
            grad[(i, 1)] = -y * (1.0 + x * a);
        } else {
            values[i] = 0.25 * (1.0 + x * a) * (1.0 + y * b) * (x * a + y * b - 1.0);
            grad[(i, 0)] = 0.25 * a * (1.0 + y * b) * (2.0 * x * a + y * b);
            grad[(i, 1)] = 0.25 * b * (1.0 + x * a) * (x * a + 2.0 * y * b);
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

/// 1D quadratic Lagrange polynomial through -1, 0, 1 and its derivative.
#[inline(always)]
fn lagrange(x: Real, node: Real) -> (Real, Real) {
    if node < -0.5 {
        (0.5 * x * (x - 1.0), x - 0.5)
    } else if node > 0.5 {
        (0.5 * x * (x + 1.0), x + 0.5)
    } else {
        (1.0 - x * x, -2.0 * x)
    }
}

pub fn biquadratic(xi: &[Real]) -> DVector<Real> {
    DVector::from_fn(9, |i, _| {
        let [a, b] = NODES[i];
        lagrange(xi[0], a).0 * lagrange(xi[1], b).0
    })
}

pub fn grad_biquadratic(xi: &[Real]) -> DMatrix<Real> {
    let mut grad = DMatrix::zeros(9, 2);
    for (i, &[a, b]) in NODES.iter().enumerate() {
        let (lx, dlx) = lagrange(xi[0], a);
        let (ly, dly) = lagrange(xi[1], b);
        grad[(i, 0)] = dlx * ly;
        grad[(i, 1)] = lx * dly;
    }
    grad
}
