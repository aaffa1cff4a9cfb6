use std::time::Instant;

use bevy::log::{debug, error, warn};
use bevy::prelude::{ResMut, Resource};
use indexmap::IndexMap;
use indexmap::map::ValuesMut;

use crate::config::LocateParams;
use crate::error::CellResult;
use crate::math::{Index, Vector};

use super::cell::Cell;
use super::node::{Node, NodeBase};
use super::particle::{Particle, ParticleBase};
use super::registry::Registry;

/// Outcome of one localization pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocateReport {
    pub located: usize,
    /// Ids of particles no cell accepted, in particle order
    pub unlocated: Vec<Index>,
}

impl LocateReport {
    pub fn all_located(&self) -> bool {
        self.unlocated.is_empty()
    }
}

/// Background mesh: owns nodes, cells and particles.
///
/// Nodes and cells are keyed by their ids. Particles keep insertion order.
#[derive(Resource)]
pub struct Mesh<const DIM: usize, N: NodeBase<DIM> = Node<DIM>, P: ParticleBase<DIM> = Particle<DIM>> {
    id: Index,
    nodes: Registry<N>,
    cells: Registry<Cell<DIM>>,
    // local index -> neighbour mesh id
    neighbours: Registry<Index>,
    particles: IndexMap<Index, P>,
    params: LocateParams,
}

impl<const DIM: usize, N: NodeBase<DIM>, P: ParticleBase<DIM>> Mesh<DIM, N, P> {
    pub fn new(id: Index) -> Self {
        Self {
            id,
            nodes: Registry::new(),
            cells: Registry::new(),
            neighbours: Registry::new(),
            particles: IndexMap::new(),
            params: LocateParams::default(),
        }
    }

    pub fn with_params(mut self, params: LocateParams) -> Self {
        self.params = params;
        self
    }

    pub fn id(&self) -> Index {
        self.id
    }

    pub fn params(&self) -> &LocateParams {
        &self.params
    }

    pub fn add_node(&mut self, node: N) -> bool {
        self.nodes.insert(node.id(), node)
    }

    pub fn remove_node(&mut self, id: Index) -> bool {
        self.nodes.remove(id)
    }

    pub fn add_cell(&mut self, cell: Cell<DIM>) -> bool {
        self.cells.insert(cell.id(), cell)
    }

    /// Remove a cell; particles located in it become unlocated.
    pub fn remove_cell(&mut self, id: Index) -> bool {
        let Some(cell) = self.cells.take(id) else {
            return false;
        };
        for particle_id in cell.particle_ids() {
            if let Some(particle) = self.particles.get_mut(&particle_id) {
                particle.clear_cell();
            }
        }
        true
    }

    /// Add a particle; a particle with the same id is rejected.
    pub fn add_particle(&mut self, particle: P) -> bool {
        let id = particle.id();
        if self.particles.contains_key(&id) {
            return false;
        }
        self.particles.insert(id, particle);
        true
    }

    /// Remove a particle and detach it from its cell.
    pub fn remove_particle(&mut self, id: Index) -> Option<P> {
        let particle = self.particles.shift_remove(&id)?;
        if let Some(cell) = particle.cell_id().and_then(|cell_id| self.cells.get_mut(cell_id)) {
            cell.remove_particle_id(id);
        }
        Some(particle)
    }

    /// Link a neighbouring mesh; a mesh cannot neighbour itself.
    pub fn add_neighbour(&mut self, local_id: usize, mesh_id: Index) -> bool {
        mesh_id != self.id && self.neighbours.insert(local_id, mesh_id)
    }

    pub fn nnodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn ncells(&self) -> usize {
        self.cells.len()
    }

    pub fn nparticles(&self) -> usize {
        self.particles.len()
    }

    pub fn nneighbours(&self) -> usize {
        self.neighbours.len()
    }

    pub fn neighbours(&self) -> &Registry<Index> {
        &self.neighbours
    }

    pub fn node(&self, id: Index) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: Index) -> Option<&mut N> {
        self.nodes.get_mut(id)
    }

    pub fn cell(&self, id: Index) -> Option<&Cell<DIM>> {
        self.cells.get(id)
    }

    pub fn cell_mut(&mut self, id: Index) -> Option<&mut Cell<DIM>> {
        self.cells.get_mut(id)
    }

    pub fn particle(&self, id: Index) -> Option<&P> {
        self.particles.get(&id)
    }

    pub fn particle_mut(&mut self, id: Index) -> Option<&mut P> {
        self.particles.get_mut(&id)
    }

    pub fn nodes(&self) -> &Registry<N> {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Registry<N> {
        &mut self.nodes
    }

    pub fn cells(&self) -> &Registry<Cell<DIM>> {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut Registry<Cell<DIM>> {
        &mut self.cells
    }

    pub fn particles(&self) -> impl Iterator<Item = &P> {
        self.particles.values()
    }

    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.particles.values_mut()
    }

    /// Cells alongside mutable nodes, for scattering into nodes.
    pub fn cells_and_nodes_mut(&mut self) -> (&Registry<Cell<DIM>>, &mut Registry<N>) {
        (&self.cells, &mut self.nodes)
    }

    /// Cells, mutable nodes and mutable particles, for per-particle kernels.
    pub fn parts_mut(&mut self) -> (&Registry<Cell<DIM>>, &mut Registry<N>, ValuesMut<'_, Index, P>) {
        (&self.cells, &mut self.nodes, self.particles.values_mut())
    }

    pub fn iterate_over_nodes<F>(&mut self, f: F)
    where
        F: FnMut(&mut N),
    {
        self.nodes.for_each_mut(f);
    }

    pub fn iterate_over_cells<F>(&mut self, f: F)
    where
        F: FnMut(&mut Cell<DIM>),
    {
        self.cells.for_each_mut(f);
    }

    pub fn iterate_over_particles<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut P),
    {
        for particle in self.particles.values_mut() {
            f(particle);
        }
    }

    pub fn compute_cell_volumes(&mut self) -> CellResult<()> {
        let volumes = self
            .cells
            .values()
            .map(|cell| cell.measure_volume(&self.nodes))
            .collect::<CellResult<Vec<_>>>()?;
        for ((_, cell), volume) in self.cells.iter_mut().zip(volumes) {
            cell.assign_volume(volume);
        }
        Ok(())
    }

    /// Active while the mesh holds at least one particle
    pub fn status(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Associate every particle with the first cell that contains it.
    ///
    /// Candidates are the particle's previous cell, then that cell's
    /// neighbours, then every cell in id order. All associations are
    /// computed before any is written, so a cell error leaves the mesh
    /// untouched.
    pub fn locate_particles_mesh(&mut self) -> CellResult<LocateReport> {
        let start = Instant::now();

        let mut found = Vec::with_capacity(self.particles.len());
        for (&particle_id, particle) in &self.particles {
            let coordinates = particle.coordinates();
            let target = match self.find_cell(particle.cell_id(), &coordinates)? {
                Some(cell) => {
                    let local = cell.local_coordinates_point_with(&self.nodes, &coordinates, &self.params)?;
                    if !local.converged {
                        warn!(
                            "particle {}: local coordinates in cell {} did not converge (residual {:.3e})",
                            particle_id,
                            cell.id(),
                            local.residual
                        );
                    }
                    Some((cell.id(), local.xi))
                }
                None => None,
            };
            found.push((particle_id, target));
        }

        let mut report = LocateReport::default();
        for (particle_id, target) in found {
            let Some(particle) = self.particles.get_mut(&particle_id) else {
                continue;
            };
            let previous = particle.cell_id();
            let next = target.map(|(cell_id, _)| cell_id);
            if previous != next {
                if let Some(cell) = previous.and_then(|cell_id| self.cells.get_mut(cell_id)) {
                    cell.remove_particle_id(particle_id);
                }
            }

            match target {
                Some((cell_id, xi)) => {
                    particle.assign_cell(cell_id, xi);
                    if let Some(cell) = self.cells.get_mut(cell_id) {
                        cell.add_particle_id(particle_id);
                    }
                    report.located += 1;
                }
                None => {
                    warn!(
                        "mesh {}: particle {} at {:?} is outside every cell",
                        self.id,
                        particle_id,
                        particle.coordinates().as_slice()
                    );
                    particle.clear_cell();
                    report.unlocated.push(particle_id);
                }
            }
        }

        let elapsed = start.elapsed().as_secs_f32() * 1000.0;
        debug!(
            "locate_particles_mesh: {} located, {} unlocated, {:.3}ms",
            report.located,
            report.unlocated.len(),
            elapsed
        );
        Ok(report)
    }

    fn find_cell(&self, previous: Option<Index>, point: &Vector<DIM>) -> CellResult<Option<&Cell<DIM>>> {
        if self.params.neighbour_fast_path {
            if let Some(cell) = previous.and_then(|cell_id| self.cells.get(cell_id)) {
                if cell.point_in_cell_with(&self.nodes, point, &self.params)? {
                    return Ok(Some(cell));
                }
                for neighbour in cell.neighbours().values().filter_map(|&id| self.cells.get(id)) {
                    if neighbour.point_in_cell_with(&self.nodes, point, &self.params)? {
                        return Ok(Some(neighbour));
                    }
                }
            }
        }

        for cell in self.cells.values() {
            if cell.point_in_cell_with(&self.nodes, point, &self.params)? {
                return Ok(Some(cell));
            }
        }
        Ok(None)
    }
}

pub fn locate_particles_system<const DIM: usize>(mut mesh: ResMut<Mesh<DIM>>) {
    if let Err(err) = mesh.locate_particles_mesh() {
        error!("mesh {}: particle localization failed: {}", mesh.id(), err);
    }
}
