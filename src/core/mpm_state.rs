use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::log::{error, info, warn};
use bevy::prelude::Resource;
use indexmap::IndexMap;

use crate::config::SolverParams;
use crate::config::constants::SOLID_PHASE;
use crate::core::checkpoint::{CheckpointHeader, restore_particle};
use crate::core::mesh::Mesh;
use crate::error::{MpmError, MpmResult};
use crate::loads::NodalLoad;
use crate::materials::{Material, MaterialProperties};
use crate::math::{Index, Real, Vector};
use crate::registry::{MaterialArgs, Registry};
use crate::solver::{self, MaterialMap};

/// Outcome of [`MpmState::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub time: Real,
    pub cancelled: bool,
    pub lost_particles: usize,
}

/// Aggregate simulation state for the solver.
#[derive(Resource)]
pub struct MpmState<const D: usize> {
    mesh: Mesh<D>,
    materials: MaterialMap<D>,
    loads: Vec<NodalLoad>,
    solver_params: SolverParams,
    gravity: Vector<D>,
    time: Real,
    step: u64,
    lost_particles: usize,
    cancel: Arc<AtomicBool>,
    halted: bool,
}

impl<const D: usize> MpmState<D> {
    pub fn new(mesh: Mesh<D>, solver_params: SolverParams) -> MpmResult<Self> {
        solver_params.validate::<D>()?;
        let gravity = solver_params.gravity_vector::<D>()?;
        Ok(Self {
            mesh,
            materials: IndexMap::new(),
            loads: Vec::new(),
            solver_params,
            gravity,
            time: 0.0,
            step: 0,
            lost_particles: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            halted: false,
        })
    }

    pub fn mesh(&self) -> &Mesh<D> {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh<D> {
        &mut self.mesh
    }

    pub fn solver_params(&self) -> &SolverParams {
        &self.solver_params
    }

    pub fn gravity(&self) -> Vector<D> {
        self.gravity
    }

    pub fn time(&self) -> Real {
        self.time
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Particles deactivated since the start of the run.
    pub fn lost_particles(&self) -> usize {
        self.lost_particles
    }

    /// Shared flag polled at the end of every timestep.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Log a fatal stage error and stop further steps.
    pub fn halt_with(&mut self, err: &MpmError) {
        error!("step {}: {}; simulation halted", self.step, err);
        self.halted = true;
    }

    pub fn material(&self, id: usize) -> Option<&dyn Material<D>> {
        self.materials.get(&id).map(|material| material.as_ref())
    }

    pub fn add_material(&mut self, material: Box<dyn Material<D>>) -> MpmResult<()> {
        let id = material.id();
        if self.materials.contains_key(&id) {
            return Err(MpmError::config(format!("duplicate material id {id}")));
        }
        self.materials.insert(id, material);
        Ok(())
    }

    pub fn create_material(
        &mut self,
        registry: &Registry,
        key: &str,
        id: usize,
        properties: MaterialProperties,
    ) -> MpmResult<()> {
        let material = registry.create::<dyn Material<D>, MaterialArgs>(key, (id, properties))?;
        self.add_material(material)
    }

    pub fn add_load(&mut self, load: NodalLoad) -> MpmResult<()> {
        if self.mesh.node(load.node).is_none() {
            return Err(MpmError::UnknownEntity {
                kind: "node",
                id: load.node,
            });
        }
        self.loads.push(load);
        Ok(())
    }

    /// Locate particles, share cell volumes and derive solid mass from the
    /// material density. Momentum is set from the current velocity.
    pub fn initialise_particles(&mut self) -> MpmResult<()> {
        self.locate_particles();
        self.mesh.compute_particle_volumes()?;

        let materials = &self.materials;
        self.mesh.iterate_particles(|particle| {
            let Some(material_id) = particle.material_id() else {
                return Ok(());
            };
            let material = materials.get(&material_id).ok_or(MpmError::UnknownEntity {
                kind: "material",
                id: material_id as Index,
            })?;
            let mass = particle.volume() * material.density();
            particle.assign_mass(SOLID_PHASE, mass)?;
            let momentum = particle.velocity(SOLID_PHASE)? * mass;
            particle.assign_momentum(SOLID_PHASE, momentum.as_slice())
        })?;

        info!(
            "initialised {} particles on {} cells",
            self.mesh.nactive_particles(),
            self.mesh.ncells()
        );
        Ok(())
    }

    /// Returns the number of particles lost in this pass.
    pub fn locate_particles(&mut self) -> usize {
        let lost = self
            .mesh
            .locate_particles(self.solver_params.locate_particles)
            .len();
        self.lost_particles += lost;
        lost
    }

    pub fn reset_nodes(&mut self) {
        self.mesh.reset_nodes();
    }

    pub fn scatter(&mut self) -> MpmResult<()> {
        solver::scatter(&mut self.mesh, &self.gravity, self.solver_params.nphases)
    }

    pub fn apply_loads(&mut self) -> MpmResult<()> {
        solver::apply_nodal_loads(&mut self.mesh, &self.loads, self.time)
    }

    pub fn solve_nodes(&mut self) -> MpmResult<()> {
        let params = &self.solver_params;
        solver::compute_nodal_velocities(&mut self.mesh, params.nphases)?;
        solver::integrate_nodes(&mut self.mesh, params.dt, params.damping, params.nphases)
    }

    pub fn gather(&mut self) -> MpmResult<()> {
        solver::gather(
            &mut self.mesh,
            &self.materials,
            self.solver_params.dt,
            self.solver_params.nphases,
        )
    }

    pub fn finish_step(&mut self) {
        self.time += self.solver_params.dt;
        self.step += 1;
    }

    /// One explicit timestep. Phases run strictly in sequence.
    pub fn step(&mut self) -> MpmResult<()> {
        self.locate_particles();
        self.reset_nodes();
        self.scatter()?;
        self.apply_loads()?;
        self.solve_nodes()?;
        self.gather()?;
        self.finish_step();
        Ok(())
    }

    /// Run up to `nsteps` timesteps. `cancel` is checked after each
    /// completed step, never inside one. A halted state runs no steps.
    pub fn run(&mut self, nsteps: u64, cancel: &AtomicBool) -> MpmResult<RunSummary> {
        let lost_before = self.lost_particles;
        let mut steps = 0;
        let mut cancelled = false;
        while steps < nsteps {
            if self.halted {
                warn!("step {}: simulation is halted, not stepping", self.step);
                break;
            }
            if let Err(err) = self.step() {
                self.halt_with(&err);
                return Err(err);
            }
            steps += 1;
            if cancel.load(Ordering::Relaxed) || self.cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
        }

        let summary = RunSummary {
            steps,
            time: self.time,
            cancelled,
            lost_particles: self.lost_particles - lost_before,
        };
        info!(
            "run finished: {} steps, t = {:.6}, cancelled = {}, lost particles = {}",
            summary.steps, summary.time, summary.cancelled, summary.lost_particles
        );
        Ok(summary)
    }

    /// Write a header and every particle, active or not, in mesh order.
    pub fn checkpoint(&self, sink: &mut dyn Write) -> MpmResult<()> {
        CheckpointHeader::new(D, self.time, self.step, self.mesh.nparticles()).write(sink)?;
        for particle in self.mesh.particles() {
            particle.save(sink)?;
        }
        Ok(())
    }

    /// Read a checkpoint written by [`MpmState::checkpoint`]. Restored
    /// particles replace those with the same id; time and step count are
    /// taken from the header. Returns the number of particles read.
    pub fn restore_particles(
        &mut self,
        registry: &Registry,
        source: &mut dyn Read,
    ) -> MpmResult<usize> {
        let header = CheckpointHeader::read(source)?;
        if header.dimension as usize != D {
            return Err(MpmError::Checkpoint(format!(
                "checkpoint is {}D, mesh is {}D",
                header.dimension, D
            )));
        }
        for _ in 0..header.nparticles {
            let particle = restore_particle::<D>(registry, source)?;
            self.mesh.replace_particle(particle);
        }
        self.time = header.time;
        self.step = header.step;
        Ok(header.nparticles as usize)
    }
}
