//! Mesh: exclusive owner of nodes, cells and particles
//!
//! Entities live in id-keyed `IndexMap`s. Ids stay valid for the lifetime of
//! the mesh; particles are never removed, only deactivated.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use bevy::log::{debug, warn};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::config::constants::NEIGHBOUR_SEARCH_RINGS;
use crate::config::{NodeSetConfig, ParticleSetConfig};
use crate::core::cell::Cell;
use crate::core::node::NodeBase;
use crate::core::particle::ParticleBase;
use crate::error::{MpmError, MpmResult};
use crate::geometry::Element;
use crate::math::{Index, Real, Vector, vector_from_slice};
use crate::registry::{EntityArgs, Registry};

pub type NodeMap<const D: usize> = IndexMap<Index, Box<dyn NodeBase<D>>>;
pub type CellMap<const D: usize> = IndexMap<Index, Cell<D>>;
pub type ParticleMap<const D: usize> = IndexMap<Index, Box<dyn ParticleBase<D>>>;

#[derive(Default)]
pub struct Mesh<const D: usize> {
    nodes: NodeMap<D>,
    cells: CellMap<D>,
    particles: ParticleMap<D>,
    /// Cell ids in ascending order, the full-scan order of particle search.
    sorted_cells: Vec<Index>,
    neighbours_stale: bool,
}

impl<const D: usize> Mesh<D> {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            cells: IndexMap::new(),
            particles: IndexMap::new(),
            sorted_cells: Vec::new(),
            neighbours_stale: false,
        }
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

    pub fn nactive_particles(&self) -> usize {
        self.particles.values().filter(|p| p.status()).count()
    }

    pub fn node(&self, id: Index) -> Option<&dyn NodeBase<D>> {
        self.nodes.get(&id).map(|node| node.as_ref())
    }

    pub fn node_mut(&mut self, id: Index) -> Option<&mut (dyn NodeBase<D> + 'static)> {
        self.nodes.get_mut(&id).map(|node| node.as_mut())
    }

    pub fn cell(&self, id: Index) -> Option<&Cell<D>> {
        self.cells.get(&id)
    }

    pub fn particle(&self, id: Index) -> Option<&dyn ParticleBase<D>> {
        self.particles.get(&id).map(|particle| particle.as_ref())
    }

    pub fn particle_mut(&mut self, id: Index) -> Option<&mut (dyn ParticleBase<D> + 'static)> {
        self.particles.get_mut(&id).map(|particle| particle.as_mut())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &dyn NodeBase<D>> {
        self.nodes.values().map(|node| node.as_ref())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell<D>> {
        self.cells.values()
    }

    pub fn particles(&self) -> impl Iterator<Item = &dyn ParticleBase<D>> {
        self.particles.values().map(|particle| particle.as_ref())
    }

    pub fn particle_map(&self) -> &ParticleMap<D> {
        &self.particles
    }

    /// Mutable particles alongside read-only grid, for the gather phase.
    pub fn split_particles_mut(&mut self) -> (&mut ParticleMap<D>, &CellMap<D>, &NodeMap<D>) {
        (&mut self.particles, &self.cells, &self.nodes)
    }

    pub fn add_node(&mut self, node: Box<dyn NodeBase<D>>) -> MpmResult<()> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(MpmError::config(format!("duplicate node id {id}")));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Create one node per coordinate through the registry, numbering from
    /// the next free id. Returns the new ids.
    pub fn create_nodes(
        &mut self,
        registry: &Registry,
        config: &NodeSetConfig,
        coordinates: &[Vector<D>],
    ) -> MpmResult<Vec<Index>> {
        config.check_dimension::<D>()?;
        let first = next_id(self.nodes.keys());
        let mut ids = Vec::with_capacity(coordinates.len());
        for (offset, x) in coordinates.iter().enumerate() {
            let id = first + offset as Index;
            let node = registry
                .create::<dyn NodeBase<D>, EntityArgs<D>>(&config.node_type, (id, *x))?;
            self.add_node(node)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// `node_ids` must be ordered as `element` expects and already exist.
    pub fn add_cell(
        &mut self,
        id: Index,
        element: Arc<dyn Element<D>>,
        node_ids: &[Index],
    ) -> MpmResult<()> {
        if self.cells.contains_key(&id) {
            return Err(MpmError::config(format!("duplicate cell id {id}")));
        }
        let nodes = node_ids
            .iter()
            .map(|&node_id| {
                self.nodes
                    .get(&node_id)
                    .map(|node| (node_id, node.coordinates()))
                    .ok_or(MpmError::UnknownEntity {
                        kind: "node",
                        id: node_id,
                    })
            })
            .collect::<MpmResult<Vec<_>>>()?;
        self.cells.insert(id, Cell::new(id, element, &nodes)?);
        self.neighbours_stale = true;
        Ok(())
    }

    pub fn add_particle(&mut self, particle: Box<dyn ParticleBase<D>>) -> MpmResult<()> {
        let id = particle.id();
        if self.particles.contains_key(&id) {
            return Err(MpmError::config(format!("duplicate particle id {id}")));
        }
        self.particles.insert(id, particle);
        Ok(())
    }

    /// Insert `particle`, replacing any particle with the same id.
    pub fn replace_particle(
        &mut self,
        particle: Box<dyn ParticleBase<D>>,
    ) -> Option<Box<dyn ParticleBase<D>>> {
        self.particles.insert(particle.id(), particle)
    }

    /// Wrap coordinates into particles of `config.particle_type`.
    pub fn create_particles(
        &mut self,
        registry: &Registry,
        config: &ParticleSetConfig,
        coordinates: &[Vector<D>],
    ) -> MpmResult<Vec<Index>> {
        config.check_dimension::<D>()?;
        let first = next_id(self.particles.keys());
        let mut ids = Vec::with_capacity(coordinates.len());
        for (offset, x) in coordinates.iter().enumerate() {
            let id = first + offset as Index;
            let mut particle = registry
                .create::<dyn ParticleBase<D>, EntityArgs<D>>(&config.particle_type, (id, *x))?;
            if let Some(material_id) = config.material_id {
                particle.assign_material_id(material_id);
            }
            self.add_particle(particle)?;
            ids.push(id);
        }
        debug!(
            "created {} `{}` particles",
            ids.len(),
            config.particle_type
        );
        Ok(ids)
    }

    /// Link every cell to the cells it shares a node with.
    pub fn compute_cell_neighbours(&mut self) {
        let mut node_cells: HashMap<Index, Vec<Index>> = HashMap::new();
        for cell in self.cells.values() {
            for &node in cell.node_ids() {
                node_cells.entry(node).or_default().push(cell.id());
            }
        }
        for cell in self.cells.values_mut() {
            let neighbours: BTreeSet<Index> = cell
                .node_ids()
                .iter()
                .filter_map(|node| node_cells.get(node))
                .flatten()
                .copied()
                .filter(|&other| other != cell.id())
                .collect();
            cell.assign_neighbours(neighbours.into_iter().collect());
        }
        self.sorted_cells = self.cells.keys().copied().collect();
        self.sorted_cells.sort_unstable();
        self.neighbours_stale = false;
    }

    /// Bind every active particle to the cell containing it.
    ///
    /// The current cell is tried first, then rings of neighbouring cells and
    /// finally every cell in ascending id order. Within one candidate set
    /// the lowest id wins. With `search` off, a particle that left its cell
    /// is not looked for. Particles found nowhere are deactivated; their ids
    /// are returned.
    pub fn locate_particles(&mut self, search: bool) -> Vec<Index> {
        if self.neighbours_stale {
            self.compute_cell_neighbours();
        }
        let cells = &self.cells;
        let sorted_cells = &self.sorted_cells;

        let mut lost: Vec<Index> = self
            .particles
            .par_values_mut()
            .filter(|particle| particle.status())
            .filter_map(|particle| {
                match locate_particle(particle.as_mut(), cells, sorted_cells, search) {
                    Ok(()) => None,
                    Err(error) => {
                        let coordinates = particle.coordinates();
                        warn!(
                            "{}; coordinates {:?}, deactivated",
                            error,
                            coordinates.as_slice()
                        );
                        particle.remove_cell();
                        particle.assign_status(false);
                        Some(particle.id())
                    }
                }
            })
            .collect();
        lost.sort_unstable();
        lost
    }

    /// Share each cell's volume equally among the active particles in it.
    pub fn compute_particle_volumes(&mut self) -> MpmResult<()> {
        let mut counts: HashMap<Index, usize> = HashMap::new();
        for particle in self.particles.values().filter(|p| p.status()) {
            if let Some(cell) = particle.cell_id() {
                *counts.entry(cell).or_default() += 1;
            }
        }
        let mut volumes = HashMap::with_capacity(counts.len());
        for (&cell, &count) in &counts {
            let cell_volume = self
                .cells
                .get(&cell)
                .ok_or(MpmError::UnknownEntity { kind: "cell", id: cell })?
                .volume()?;
            volumes.insert(cell, cell_volume / count as Real);
        }
        for particle in self.particles.values_mut().filter(|p| p.status()) {
            if let Some(volume) = particle.cell_id().and_then(|cell| volumes.get(&cell)) {
                particle.assign_volume(*volume);
            }
        }
        Ok(())
    }

    /// Zero the per-step node accumulators.
    pub fn reset_nodes(&mut self) {
        self.nodes.par_values_mut().for_each(|node| node.initialise());
    }

    pub fn iterate_nodes<F>(&mut self, f: F) -> MpmResult<()>
    where
        F: Fn(&mut dyn NodeBase<D>) -> MpmResult<()> + Send + Sync,
    {
        self.nodes
            .par_values_mut()
            .try_for_each(|node| f(node.as_mut()))
    }

    /// Apply `f` to every active particle.
    pub fn iterate_particles<F>(&mut self, f: F) -> MpmResult<()>
    where
        F: Fn(&mut dyn ParticleBase<D>) -> MpmResult<()> + Send + Sync,
    {
        self.particles
            .par_values_mut()
            .filter(|particle| particle.status())
            .try_for_each(|particle| f(particle.as_mut()))
    }

    pub fn total_particle_mass(&self, phase: usize) -> MpmResult<Real> {
        self.particles()
            .filter(|p| p.status())
            .map(|p| p.mass(phase))
            .sum()
    }

    pub fn total_node_mass(&self, phase: usize) -> MpmResult<Real> {
        self.nodes().map(|n| n.mass(phase)).sum()
    }

    pub fn total_particle_momentum(&self, phase: usize) -> MpmResult<Vector<D>> {
        self.particles()
            .filter(|p| p.status())
            .map(|p| p.momentum(phase))
            .sum()
    }

    pub fn total_node_momentum(&self, phase: usize) -> MpmResult<Vector<D>> {
        self.nodes()
            .map(|n| n.momentum(phase).and_then(|m| vector_from_slice::<D>(m.as_slice())))
            .sum()
    }
}

fn next_id<'a>(ids: impl Iterator<Item = &'a Index>) -> Index {
    ids.max().map_or(0, |id| id + 1)
}

fn try_cells<'a, const D: usize>(
    particle: &mut dyn ParticleBase<D>,
    cells: &CellMap<D>,
    candidates: impl IntoIterator<Item = &'a Index>,
) -> bool {
    candidates
        .into_iter()
        .filter_map(|id| cells.get(id))
        .any(|cell| particle.assign_cell(cell))
}

fn locate_particle<const D: usize>(
    particle: &mut dyn ParticleBase<D>,
    cells: &CellMap<D>,
    sorted_cells: &[Index],
    search: bool,
) -> MpmResult<()> {
    let current = particle.cell_id().and_then(|id| cells.get(&id));
    if let Some(cell) = current {
        if particle.assign_cell(cell) {
            return Ok(());
        }
        if !search {
            return Err(MpmError::CellAssignment {
                particle: particle.id(),
                cell: cell.id(),
            });
        }

        let mut visited = BTreeSet::from([cell.id()]);
        let mut ring: BTreeSet<Index> = cell.neighbours().iter().copied().collect();
        for _ in 0..NEIGHBOUR_SEARCH_RINGS {
            ring.retain(|id| !visited.contains(id));
            if ring.is_empty() {
                break;
            }
            if try_cells(particle, cells, &ring) {
                return Ok(());
            }
            visited.extend(ring.iter().copied());
            ring = ring
                .iter()
                .filter_map(|id| cells.get(id))
                .flat_map(|cell| cell.neighbours().iter().copied())
                .collect();
        }
    }

    if try_cells(particle, cells, sorted_cells) {
        Ok(())
    } else {
        Err(MpmError::ParticleLost {
            particle: particle.id(),
        })
    }
}
