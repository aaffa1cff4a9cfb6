//! Cells of the background mesh
//!
//! A cell binds the ids of its nodes and neighbouring cells, one shape
//! function, and the ids of the particles currently inside it. Geometry and
//! transfer kernels read node state from the node registry they are handed,
//! keyed by node id.

use bevy::log::debug;
use indexmap::IndexSet;
use nalgebra::{DMatrix, DVector};

use crate::config::LocateParams;
use crate::error::{CellError, CellResult};
use crate::math::{
    Index, Real, Vector, VoigtStress, from_dvector, reduced_stress, tetrahedron_volume,
    to_dvector, triangle_area, zero_vector,
};
use crate::shapefn::{ShapeFn, bmatrix_from_gradients};

use super::node::NodeBase;
use super::registry::Registry;

/// Result of inverting the isoparametric map for one point.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalCoordinates<const DIM: usize> {
    pub xi: Vector<DIM>,
    pub converged: bool,
    pub iterations: usize,
    /// Distance between the query point and the image of `xi`
    pub residual: Real,
}

#[derive(Clone, Debug)]
pub struct Cell<const DIM: usize> {
    id: Index,
    nnodes: usize,
    volume: Option<Real>,
    particles: IndexSet<Index>,
    // local node index -> global node id
    nodes: Registry<Index>,
    // local neighbour index -> cell id
    neighbours: Registry<Index>,
    shapefn: Option<ShapeFn>,
}

impl<const DIM: usize> Cell<DIM> {
    pub fn new(id: Index, nnodes: usize) -> Self {
        Self {
            id,
            nnodes,
            volume: None,
            particles: IndexSet::new(),
            nodes: Registry::new(),
            neighbours: Registry::new(),
            shapefn: None,
        }
    }

    pub fn with_shapefn(id: Index, nnodes: usize, shapefn: ShapeFn) -> CellResult<Self> {
        let mut cell = Self::new(id, nnodes);
        cell.assign_shapefn(shapefn)?;
        Ok(cell)
    }

    pub fn id(&self) -> Index {
        self.id
    }

    /// Number of nodes bound so far
    pub fn nnodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes the cell was declared with
    pub fn nnodes_expected(&self) -> usize {
        self.nnodes
    }

    /// Shape function assigned, every node bound and volume computed
    pub fn is_initialised(&self) -> bool {
        self.shapefn.is_some() && self.nodes.len() == self.nnodes && self.volume.is_some()
    }

    /// Active while at least one particle is inside
    pub fn status(&self) -> bool {
        !self.particles.is_empty()
    }

    pub fn shapefn(&self) -> Option<ShapeFn> {
        self.shapefn
    }

    /// Bind a shape function. Any previously computed volume is cleared.
    pub fn assign_shapefn(&mut self, shapefn: ShapeFn) -> CellResult<()> {
        if shapefn.tdim() != DIM {
            return Err(CellError::DimensionMismatch {
                cell: self.id,
                expected: DIM,
                found: shapefn.tdim(),
            });
        }
        if shapefn.nfunctions() != self.nnodes {
            return Err(CellError::ShapeFnMismatch {
                cell: self.id,
                expected: self.nnodes,
                found: shapefn.nfunctions(),
            });
        }
        self.shapefn = Some(shapefn);
        self.volume = None;
        Ok(())
    }

    /// Number of shape functions, zero while none is assigned
    pub fn nfunctions(&self) -> usize {
        self.shapefn.map_or(0, |shapefn| shapefn.nfunctions())
    }

    /// Bind node `node_id` at local index `local_id`; fails if the slot is
    /// taken or beyond the declared node count.
    pub fn add_node(&mut self, local_id: usize, node_id: Index) -> bool {
        local_id < self.nnodes && self.nodes.insert(local_id, node_id)
    }

    pub fn node_ids(&self) -> &Registry<Index> {
        &self.nodes
    }

    pub fn add_neighbour(&mut self, local_id: usize, neighbour_id: Index) -> bool {
        neighbour_id != self.id && self.neighbours.insert(local_id, neighbour_id)
    }

    pub fn nneighbours(&self) -> usize {
        self.neighbours.len()
    }

    pub fn neighbours(&self) -> &Registry<Index> {
        &self.neighbours
    }

    /// Record a particle inside the cell; fails if already recorded.
    pub fn add_particle_id(&mut self, id: Index) -> bool {
        self.particles.insert(id)
    }

    pub fn remove_particle_id(&mut self, id: Index) {
        self.particles.shift_remove(&id);
    }

    pub fn particle_ids(&self) -> impl Iterator<Item = Index> + '_ {
        self.particles.iter().copied()
    }

    pub fn nparticles(&self) -> usize {
        self.particles.len()
    }

    pub fn volume(&self) -> Option<Real> {
        self.volume
    }

    /// Compute and store the cell volume from its corner nodes.
    pub fn compute_volume<N: NodeBase<DIM>>(&mut self, nodes: &Registry<N>) -> CellResult<Real> {
        let volume = self.measure_volume(nodes)?;
        self.assign_volume(volume);
        Ok(volume)
    }

    /// Cell volume from its corner nodes, without storing it.
    ///
    /// The polygon / polyhedron is split into sub-triangles / sub-tetrahedra
    /// joining each boundary facet to the corner centroid.
    pub fn measure_volume<N: NodeBase<DIM>>(&self, nodes: &Registry<N>) -> CellResult<Real> {
        let shapefn = self.require_geometry()?;
        let coordinates = self.nodal_coordinates(nodes)?;

        let corners = shapefn.corner_indices();
        let centroid = corners
            .iter()
            .fold(zero_vector::<DIM>(), |sum, &i| sum + coordinates[i])
            / corners.len() as Real;

        let volume = shapefn
            .inhedron_indices()
            .chunks_exact(DIM)
            .map(|facet| sub_volume(&centroid, facet, &coordinates))
            .sum::<Real>()
            .abs();

        if !(volume.is_finite() && volume > 0.0) {
            return Err(CellError::DegenerateVolume {
                cell: self.id,
                volume,
            });
        }

        Ok(volume)
    }

    pub(crate) fn assign_volume(&mut self, volume: Real) {
        debug!("cell {}: volume {:.6e}", self.id, volume);
        self.volume = Some(volume);
    }

    pub fn point_in_cell<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        point: &Vector<DIM>,
    ) -> CellResult<bool> {
        self.point_in_cell_with(nodes, point, &LocateParams::default())
    }

    /// Containment by volume decomposition: with `point` as the apex of every
    /// facet's sub-volume, the absolute sub-volumes add up to the cell volume
    /// only when the point is inside (exact for convex cells).
    pub fn point_in_cell_with<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        point: &Vector<DIM>,
        params: &LocateParams,
    ) -> CellResult<bool> {
        let (shapefn, volume) = self.require_initialised()?;
        let coordinates = self.nodal_coordinates(nodes)?;

        let decomposed: Real = shapefn
            .inhedron_indices()
            .chunks_exact(DIM)
            .map(|facet| sub_volume(point, facet, &coordinates).abs())
            .sum();

        Ok((decomposed - volume).abs() <= params.containment_tolerance * volume)
    }

    /// Global coordinates of the local coordinate `xi`
    pub fn global_coordinates<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        xi: &Vector<DIM>,
    ) -> CellResult<Vector<DIM>> {
        let (shapefn, _) = self.require_initialised()?;
        let coordinates = self.nodal_coordinates(nodes)?;
        Ok(map_to_global(shapefn, &coordinates, xi.as_slice()))
    }

    pub fn local_coordinates_point<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        point: &Vector<DIM>,
    ) -> CellResult<LocalCoordinates<DIM>> {
        self.local_coordinates_point_with(nodes, point, &LocateParams::default())
    }

    /// Invert `x(xi) = sum_i N_i(xi) x_i` with Newton-Raphson iterations
    /// starting from the reference centroid.
    ///
    /// Hitting the iteration cap or a singular Jacobian is not an error: the
    /// last estimate is returned with `converged == false`.
    pub fn local_coordinates_point_with<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        point: &Vector<DIM>,
        params: &LocateParams,
    ) -> CellResult<LocalCoordinates<DIM>> {
        let (shapefn, _) = self.require_initialised()?;
        let coordinates = self.nodal_coordinates(nodes)?;

        let mut xi = shapefn.reference_centroid();
        let mut iterations = 0;
        let mut converged = false;
        while iterations < params.newton_max_iterations {
            let residual = point - map_to_global(shapefn, &coordinates, xi.as_slice());
            if residual.norm() <= params.newton_tolerance {
                converged = true;
                break;
            }

            iterations += 1;
            let jacobian = jacobian(&coordinates, &shapefn.grad_shapefn(xi.as_slice()));
            let Some(step) = jacobian
                .lu()
                .solve(&to_dvector(&residual))
                .filter(|step| step.iter().all(|v| v.is_finite()))
            else {
                debug!("cell {}: singular Jacobian after {} iterations", self.id, iterations);
                break;
            };
            xi += &step;
            if step.norm() <= params.newton_tolerance {
                converged = true;
                break;
            }
        }

        let residual = (point - map_to_global(shapefn, &coordinates, xi.as_slice())).norm();
        Ok(LocalCoordinates {
            xi: from_dvector(&xi),
            converged,
            iterations,
            residual,
        })
    }

    pub fn map_particle_mass_to_nodes<N: NodeBase<DIM>>(
        &self,
        nodes: &mut Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        pmass: Real,
    ) -> CellResult<()> {
        let weights = self.weights(xi)?;
        self.scatter(nodes, phase, |slot, node| {
            node.update_mass(phase, weights[slot] * pmass)
        })
    }

    pub fn map_particle_volume_to_nodes<N: NodeBase<DIM>>(
        &self,
        nodes: &mut Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        pvolume: Real,
    ) -> CellResult<()> {
        let weights = self.weights(xi)?;
        self.scatter(nodes, phase, |slot, node| {
            node.update_volume(phase, weights[slot] * pvolume)
        })
    }

    pub fn compute_nodal_momentum<N: NodeBase<DIM>>(
        &self,
        nodes: &mut Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        pmass: Real,
        pvelocity: &Vector<DIM>,
    ) -> CellResult<()> {
        let weights = self.weights(xi)?;
        self.scatter(nodes, phase, |slot, node| {
            node.update_momentum(phase, &(pvelocity * (weights[slot] * pmass)))
        })
    }

    pub fn compute_nodal_body_force<N: NodeBase<DIM>>(
        &self,
        nodes: &mut Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        pmass: Real,
        pgravity: &Vector<DIM>,
    ) -> CellResult<()> {
        let weights = self.weights(xi)?;
        self.scatter(nodes, phase, |slot, node| {
            node.update_external_force(phase, &(pgravity * (weights[slot] * pmass)))
        })
    }

    /// Scatter `-B_i^T * stress * volume` onto every node. B-matrices use
    /// gradients with respect to global coordinates at `xi`.
    pub fn compute_nodal_internal_force<N: NodeBase<DIM>>(
        &self,
        nodes: &mut Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        pvolume: Real,
        pstress: &VoigtStress,
    ) -> CellResult<()> {
        let (shapefn, _) = self.require_initialised()?;
        let coordinates = self.nodal_coordinates(nodes)?;
        let gradients = self.global_gradients(shapefn, &coordinates, xi)?;
        let stress = reduced_stress(pstress, DIM);

        let forces: Vec<Vector<DIM>> = bmatrix_from_gradients(&gradients)
            .iter()
            .map(|b| from_dvector(&(b.transpose() * &stress * -pvolume)))
            .collect();

        self.scatter(nodes, phase, |slot, node| {
            node.update_internal_force(phase, &forces[slot])
        })
    }

    pub fn interpolate_nodal_velocity<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
    ) -> CellResult<Vector<DIM>> {
        self.gather(nodes, xi, phase, |node| node.velocity(phase))
    }

    pub fn interpolate_nodal_acceleration<N: NodeBase<DIM>>(
        &self,
        nodes: &Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
    ) -> CellResult<Vector<DIM>> {
        self.gather(nodes, xi, phase, |node| node.acceleration(phase))
    }

    fn require_geometry(&self) -> CellResult<ShapeFn> {
        let shapefn = self
            .shapefn
            .ok_or(CellError::MissingShapeFn { cell: self.id })?;
        if self.nodes.len() != self.nnodes {
            return Err(CellError::IncompleteNodes {
                cell: self.id,
                expected: self.nnodes,
                found: self.nodes.len(),
            });
        }
        Ok(shapefn)
    }

    fn require_initialised(&self) -> CellResult<(ShapeFn, Real)> {
        let shapefn = self.require_geometry()?;
        let volume = self
            .volume
            .ok_or(CellError::VolumeNotComputed { cell: self.id })?;
        Ok((shapefn, volume))
    }

    fn weights(&self, xi: &Vector<DIM>) -> CellResult<DVector<Real>> {
        let (shapefn, _) = self.require_initialised()?;
        Ok(shapefn.shapefn(xi.as_slice()))
    }

    /// Coordinates of the bound nodes in local index order.
    fn nodal_coordinates<N: NodeBase<DIM>>(&self, nodes: &Registry<N>) -> CellResult<Vec<Vector<DIM>>> {
        self.nodes
            .values()
            .map(|&node_id| {
                nodes
                    .get(node_id)
                    .map(|node| node.coordinates())
                    .ok_or(CellError::MissingNode {
                        cell: self.id,
                        node: node_id,
                    })
            })
            .collect()
    }

    fn global_gradients(
        &self,
        shapefn: ShapeFn,
        coordinates: &[Vector<DIM>],
        xi: &Vector<DIM>,
    ) -> CellResult<DMatrix<Real>> {
        let local = shapefn.grad_shapefn(xi.as_slice());
        let inverse = jacobian(coordinates, &local)
            .try_inverse()
            .ok_or(CellError::SingularJacobian { cell: self.id })?;
        Ok(local * inverse)
    }

    fn validate_nodes<N: NodeBase<DIM>>(&self, nodes: &Registry<N>, phase: usize) -> CellResult<()> {
        for &node_id in self.nodes.values() {
            let node = nodes.get(node_id).ok_or(CellError::MissingNode {
                cell: self.id,
                node: node_id,
            })?;
            if phase >= node.nphases() {
                return Err(CellError::InvalidPhase {
                    cell: self.id,
                    node: node_id,
                    phase,
                    nphases: node.nphases(),
                });
            }
        }
        Ok(())
    }

    /// Every bound node is checked before the first write.
    fn scatter<N, F>(&self, nodes: &mut Registry<N>, phase: usize, mut apply: F) -> CellResult<()>
    where
        N: NodeBase<DIM>,
        F: FnMut(usize, &mut N),
    {
        self.validate_nodes(nodes, phase)?;
        for (slot, &node_id) in self.nodes.iter() {
            if let Some(node) = nodes.get_mut(node_id) {
                apply(slot, node);
            }
        }
        Ok(())
    }

    fn gather<N, F>(
        &self,
        nodes: &Registry<N>,
        xi: &Vector<DIM>,
        phase: usize,
        quantity: F,
    ) -> CellResult<Vector<DIM>>
    where
        N: NodeBase<DIM>,
        F: Fn(&N) -> Vector<DIM>,
    {
        let weights = self.weights(xi)?;
        self.validate_nodes(nodes, phase)?;
        let mut value = zero_vector::<DIM>();
        for (slot, &node_id) in self.nodes.iter() {
            if let Some(node) = nodes.get(node_id) {
                value += quantity(node) * weights[slot];
            }
        }
        Ok(value)
    }
}

fn map_to_global<const DIM: usize>(
    shapefn: ShapeFn,
    coordinates: &[Vector<DIM>],
    xi: &[Real],
) -> Vector<DIM> {
    let weights = shapefn.shapefn(xi);
    coordinates
        .iter()
        .zip(weights.iter())
        .fold(zero_vector::<DIM>(), |sum, (x, &w)| sum + x * w)
}

/// `J[a][b] = sum_i x_i[a] * dN_i/dxi_b`
fn jacobian<const DIM: usize>(coordinates: &[Vector<DIM>], grad: &DMatrix<Real>) -> DMatrix<Real> {
    DMatrix::from_fn(DIM, DIM, |a, b| {
        coordinates
            .iter()
            .enumerate()
            .map(|(i, x)| x[a] * grad[(i, b)])
            .sum::<Real>()
    })
}

/// Signed area / volume of the simplex joining `apex` to one boundary facet.
fn sub_volume<const DIM: usize>(apex: &Vector<DIM>, facet: &[usize], coordinates: &[Vector<DIM>]) -> Real {
    match DIM {
        2 => triangle_area(
            apex.as_slice(),
            coordinates[facet[0]].as_slice(),
            coordinates[facet[1]].as_slice(),
        ),
        3 => tetrahedron_volume(
            apex.as_slice(),
            coordinates[facet[0]].as_slice(),
            coordinates[facet[1]].as_slice(),
            coordinates[facet[2]].as_slice(),
        ),
        // No shape function exists for other dimensions.
        _ => 0.0,
    }
}
