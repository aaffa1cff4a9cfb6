//! Shape functions for the background mesh elements
//!
//! Every element family implements one contract: interpolation weights and
//! their local gradients at a local coordinate `xi`, small-strain B-matrices,
//! and the corner / facet tables used to split a cell into sub-triangles (2D)
//! or sub-tetrahedra (3D). Shape functions carry no state and can be shared
//! by every cell of the same family.

pub mod hexahedron;
pub mod quadrilateral;
pub mod simplex;

use nalgebra::{DMatrix, DVector};

use crate::math::{Real, voigt_dof};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeFn {
    Triangle3,
    Quadrilateral4,
    Quadrilateral8,
    Quadrilateral9,
    Tetrahedron4,
    Hexahedron8,
    Hexahedron20,
}

impl ShapeFn {
    pub const ALL: [ShapeFn; 7] = [
        ShapeFn::Triangle3,
        ShapeFn::Quadrilateral4,
        ShapeFn::Quadrilateral8,
        ShapeFn::Quadrilateral9,
        ShapeFn::Tetrahedron4,
        ShapeFn::Hexahedron8,
        ShapeFn::Hexahedron20,
    ];

    /// Dimension of the reference element
    pub fn tdim(&self) -> usize {
        match self {
            Self::Triangle3 | Self::Quadrilateral4 | Self::Quadrilateral8 | Self::Quadrilateral9 => 2,
            Self::Tetrahedron4 | Self::Hexahedron8 | Self::Hexahedron20 => 3,
        }
    }

    /// Number of shape functions, one per element node
    pub fn nfunctions(&self) -> usize {
        match self {
            Self::Triangle3 => 3,
            Self::Quadrilateral4 => 4,
            Self::Quadrilateral8 => 8,
            Self::Quadrilateral9 => 9,
            Self::Tetrahedron4 => 4,
            Self::Hexahedron8 => 8,
            Self::Hexahedron20 => 20,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Triangle3 => "triangle3",
            Self::Quadrilateral4 => "quadrilateral4",
            Self::Quadrilateral8 => "quadrilateral8",
            Self::Quadrilateral9 => "quadrilateral9",
            Self::Tetrahedron4 => "tetrahedron4",
            Self::Hexahedron8 => "hexahedron8",
            Self::Hexahedron20 => "hexahedron20",
        }
    }

    /// Weights of the element nodes at `xi`.
    ///
    /// `xi` must hold `tdim()` components.
    pub fn shapefn(&self, xi: &[Real]) -> DVector<Real> {
        debug_assert_eq!(xi.len(), self.tdim());
        match self {
            Self::Triangle3 => simplex::triangle(xi),
            Self::Quadrilateral4 => quadrilateral::bilinear(xi),
            Self::Quadrilateral8 => quadrilateral::serendipity(xi),
            Self::Quadrilateral9 => quadrilateral::biquadratic(xi),
            Self::Tetrahedron4 => simplex::tetrahedron(xi),
            Self::Hexahedron8 => hexahedron::trilinear(xi),
            Self::Hexahedron20 => hexahedron::serendipity(xi),
        }
    }

    /// Local gradients at `xi`, one row per node (`nfunctions() x tdim()`).
    pub fn grad_shapefn(&self, xi: &[Real]) -> DMatrix<Real> {
        debug_assert_eq!(xi.len(), self.tdim());
        match self {
            Self::Triangle3 => simplex::grad_triangle(xi),
            Self::Quadrilateral4 => quadrilateral::grad_bilinear(xi),
            Self::Quadrilateral8 => quadrilateral::grad_serendipity(xi),
            Self::Quadrilateral9 => quadrilateral::grad_biquadratic(xi),
            Self::Tetrahedron4 => simplex::grad_tetrahedron(xi),
            Self::Hexahedron8 => hexahedron::grad_trilinear(xi),
            Self::Hexahedron20 => hexahedron::grad_serendipity(xi),
        }
    }

    /// Strain-displacement matrices in local coordinates, one per node.
    pub fn bmatrix(&self, xi: &[Real]) -> Vec<DMatrix<Real>> {
        bmatrix_from_gradients(&self.grad_shapefn(xi))
    }

    /// Canonical local coordinates of every node (`nfunctions() x tdim()`).
    pub fn node_local_coordinates(&self) -> DMatrix<Real> {
        let n = self.nfunctions();
        match self {
            Self::Triangle3 => table(&simplex::TRIANGLE_NODES),
            Self::Quadrilateral4 | Self::Quadrilateral8 | Self::Quadrilateral9 => {
                table(&quadrilateral::NODES[..n])
            }
            Self::Tetrahedron4 => table(&simplex::TETRAHEDRON_NODES),
            Self::Hexahedron8 | Self::Hexahedron20 => table(&hexahedron::NODES[..n]),
        }
    }

    /// Centroid of the reference element, the starting point for inverse mapping
    pub fn reference_centroid(&self) -> DVector<Real> {
        match self {
            Self::Triangle3 => DVector::from_element(2, 1.0 / 3.0),
            Self::Tetrahedron4 => DVector::from_element(3, 0.25),
            _ => DVector::zeros(self.tdim()),
        }
    }

    /// Nodes spanning the cell's polygon / polyhedron.
    pub fn corner_indices(&self) -> &'static [usize] {
        match self {
            Self::Triangle3 => &simplex::TRIANGLE_CORNERS,
            Self::Quadrilateral4 | Self::Quadrilateral8 | Self::Quadrilateral9 => {
                &quadrilateral::CORNERS
            }
            Self::Tetrahedron4 => &simplex::TETRAHEDRON_CORNERS,
            Self::Hexahedron8 | Self::Hexahedron20 => &hexahedron::CORNERS,
        }
    }

    /// Boundary facets used for sub-volume decomposition, flattened with
    /// `tdim()` node indices per facet: counter-clockwise edges in 2D,
    /// outward-wound triangles in 3D. Joining each facet to an apex yields
    /// one sub-triangle or sub-tetrahedron.
    pub fn inhedron_indices(&self) -> &'static [usize] {
        match self {
            Self::Triangle3 => &simplex::TRIANGLE_EDGES,
            Self::Quadrilateral4 | Self::Quadrilateral8 | Self::Quadrilateral9 => {
                &quadrilateral::EDGES
            }
            Self::Tetrahedron4 => &simplex::TETRAHEDRON_FACES,
            Self::Hexahedron8 | Self::Hexahedron20 => &hexahedron::FACE_TRIANGLES,
        }
    }
}

fn table<const D: usize>(rows: &[[Real; D]]) -> DMatrix<Real> {
    DMatrix::from_fn(rows.len(), D, |i, j| rows[i][j])
}

/// Small-strain B-matrices from a gradient matrix (one row per node).
///
/// 2D rows: (xx, yy, xy). 3D rows: (xx, yy, zz, xy, yz, xz).
pub fn bmatrix_from_gradients(grad: &DMatrix<Real>) -> Vec<DMatrix<Real>> {
    let dim = grad.ncols();
    (0..grad.nrows())
        .map(|i| {
            let mut b = DMatrix::zeros(voigt_dof(dim), dim);
            if dim == 2 {
                let (dx, dy) = (grad[(i, 0)], grad[(i, 1)]);
                b[(0, 0)] = dx;
                b[(1, 1)] = dy;
                b[(2, 0)] = dy;
                b[(2, 1)] = dx;
            } else {
                let (dx, dy, dz) = (grad[(i, 0)], grad[(i, 1)], grad[(i, 2)]);
                b[(0, 0)] = dx;
                b[(1, 1)] = dy;
                b[(2, 2)] = dz;
                b[(3, 0)] = dy;
                b[(3, 1)] = dx;
                b[(4, 1)] = dz;
                b[(4, 2)] = dy;
                b[(5, 0)] = dz;
                b[(5, 2)] = dx;
            }
            b
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{tetrahedron_volume, triangle_area};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: Real = 1e-9;

    fn sample_xi(shapefn: ShapeFn, rng: &mut StdRng) -> Vec<Real> {
        match shapefn {
            ShapeFn::Triangle3 | ShapeFn::Tetrahedron4 => {
                // Rejection sample inside the unit simplex
                loop {
                    let xi: Vec<Real> = (0..shapefn.tdim())
                        .map(|_| rng.random_range(0.0..1.0))
                        .collect();
                    if xi.iter().sum::<Real>() <= 1.0 {
                        return xi;
                    }
                }
            }
            _ => (0..shapefn.tdim())
                .map(|_| rng.random_range(-1.0..=1.0))
                .collect(),
        }
    }

    #[test]
    fn partition_of_unity() {
        let mut rng = StdRng::seed_from_u64(17);
        for shapefn in ShapeFn::ALL {
            for _ in 0..50 {
                let xi = sample_xi(shapefn, &mut rng);
                let weights = shapefn.shapefn(&xi);
                assert_eq!(weights.len(), shapefn.nfunctions());
                assert_relative_eq!(weights.sum(), 1.0, epsilon = TOLERANCE);
            }
        }
    }

    #[test]
    fn gradients_sum_to_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        for shapefn in ShapeFn::ALL {
            let xi = sample_xi(shapefn, &mut rng);
            let grad = shapefn.grad_shapefn(&xi);
            assert_eq!(grad.shape(), (shapefn.nfunctions(), shapefn.tdim()));
            for axis in 0..shapefn.tdim() {
                assert_relative_eq!(grad.column(axis).sum(), 0.0, epsilon = TOLERANCE);
            }
        }
    }

    #[test]
    fn nodal_interpolation() {
        for shapefn in ShapeFn::ALL {
            let nodes = shapefn.node_local_coordinates();
            for i in 0..shapefn.nfunctions() {
                let xi: Vec<Real> = nodes.row(i).iter().copied().collect();
                let weights = shapefn.shapefn(&xi);
                for j in 0..shapefn.nfunctions() {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_relative_eq!(weights[j], expected, epsilon = TOLERANCE);
                }
            }
        }
    }

    #[test]
    fn gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(29);
        let h = 1e-6;
        for shapefn in ShapeFn::ALL {
            let xi = sample_xi(shapefn, &mut rng);
            let grad = shapefn.grad_shapefn(&xi);
            for axis in 0..shapefn.tdim() {
                let mut forward = xi.clone();
                let mut backward = xi.clone();
                forward[axis] += h;
                backward[axis] -= h;
                let difference = (shapefn.shapefn(&forward) - shapefn.shapefn(&backward)) / (2.0 * h);
                for i in 0..shapefn.nfunctions() {
                    assert_relative_eq!(grad[(i, axis)], difference[i], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn reference_centroid_lies_inside() {
        for shapefn in ShapeFn::ALL {
            let centroid = shapefn.reference_centroid();
            let weights = shapefn.shapefn(centroid.as_slice());
            assert!(weights.iter().all(|w| w.is_finite()));
            assert_relative_eq!(weights.sum(), 1.0, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn facets_enclose_reference_volume() {
        for shapefn in ShapeFn::ALL {
            let nodes = shapefn.node_local_coordinates();
            let dim = shapefn.tdim();
            let corners = shapefn.corner_indices();
            let facets = shapefn.inhedron_indices();
            assert_eq!(facets.len() % dim, 0);
            assert!(facets.iter().all(|i| corners.contains(i)));

            let centroid = shapefn.reference_centroid();
            let point = |i: usize| -> Vec<Real> { nodes.row(i).iter().copied().collect() };
            let volume: Real = facets
                .chunks_exact(dim)
                .map(|facet| match dim {
                    2 => triangle_area(centroid.as_slice(), &point(facet[0]), &point(facet[1])),
                    _ => tetrahedron_volume(
                        centroid.as_slice(),
                        &point(facet[0]),
                        &point(facet[1]),
                        &point(facet[2]),
                    ),
                })
                .sum();

            let expected = match shapefn {
                ShapeFn::Triangle3 => 0.5,
                ShapeFn::Tetrahedron4 => 1.0 / 6.0,
                _ if dim == 2 => 4.0,
                _ => 8.0,
            };
            assert_relative_eq!(volume, expected, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn bmatrix_layout_2d() {
        let shapefn = ShapeFn::Quadrilateral4;
        let xi = [0.25, -0.5];
        let grad = shapefn.grad_shapefn(&xi);
        let bmatrix = shapefn.bmatrix(&xi);

        assert_eq!(bmatrix.len(), 4);
        for (i, b) in bmatrix.iter().enumerate() {
            assert_eq!(b.shape(), (3, 2));
            assert_eq!(b[(0, 0)], grad[(i, 0)]);
            assert_eq!(b[(0, 1)], 0.0);
            assert_eq!(b[(1, 1)], grad[(i, 1)]);
            assert_eq!(b[(2, 0)], grad[(i, 1)]);
            assert_eq!(b[(2, 1)], grad[(i, 0)]);
        }
    }

    #[test]
    fn bmatrix_layout_3d() {
        let shapefn = ShapeFn::Hexahedron8;
        let xi = [0.1, 0.2, -0.3];
        let grad = shapefn.grad_shapefn(&xi);
        let bmatrix = shapefn.bmatrix(&xi);

        assert_eq!(bmatrix.len(), 8);
        let b = &bmatrix[6];
        assert_eq!(b.shape(), (6, 3));
        assert_eq!(b[(2, 2)], grad[(6, 2)]);
        assert_eq!(b[(3, 0)], grad[(6, 1)]);
        assert_eq!(b[(4, 2)], grad[(6, 1)]);
        assert_eq!(b[(5, 0)], grad[(6, 2)]);
        assert_eq!(b[(5, 1)], 0.0);
    }
}
