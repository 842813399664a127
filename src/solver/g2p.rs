//! Node-to-particle (G2P) transfer
//!
//! Uses the same weights as the scatter. Velocity and acceleration are
//! interpolated per phase; the solid phase additionally updates strain,
//! stress and position.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::config::constants::SOLID_PHASE;
use crate::core::{Cell, Mesh, NodeMap, ParticleBase};
use crate::error::{MpmError, MpmResult};
use crate::materials::Material;
use crate::math::{Index, Matrix, Real, Vector, strain_rate_from_gradient, vector_from_slice};

pub type MaterialMap<const D: usize> = IndexMap<usize, Box<dyn Material<D>>>;

/// Node velocity and acceleration of `phase` as D-vectors.
fn node_kinematics<const D: usize>(
    nodes: &NodeMap<D>,
    id: Index,
    phase: usize,
) -> MpmResult<(Vector<D>, Vector<D>)> {
    let node = nodes
        .get(&id)
        .ok_or(MpmError::UnknownEntity { kind: "node", id })?;
    let velocity = vector_from_slice::<D>(node.velocity(phase)?.as_slice())?;
    let acceleration = vector_from_slice::<D>(node.acceleration(phase)?.as_slice())?;
    Ok((velocity, acceleration))
}

/// Interpolate node state back onto one particle and advance it by `dt`.
pub fn update_particle<const D: usize>(
    particle: &mut dyn ParticleBase<D>,
    cell: &Cell<D>,
    nodes: &NodeMap<D>,
    materials: &MaterialMap<D>,
    dt: Real,
    nphases: usize,
) -> MpmResult<()> {
    let xi = particle.local_coordinates();
    let weights = cell.shape_functions(&xi);

    for phase in 0..nphases.min(particle.nphases()) {
        let mut velocity = Vector::<D>::zeros();
        let mut acceleration = Vector::<D>::zeros();
        for &(node, weight) in &weights {
            let (v, a) = node_kinematics(nodes, node, phase)?;
            velocity += v * weight;
            acceleration += a * weight;
        }
        let momentum = velocity * particle.mass(phase)?;
        particle.assign_velocity(phase, velocity.as_slice())?;
        particle.assign_acceleration(phase, acceleration.as_slice())?;
        particle.assign_momentum(phase, momentum.as_slice())?;
    }

    // L = sum_i v_i (x) grad N_i
    let mut velocity_gradient = Matrix::<D>::zeros();
    for (node, gradient) in cell.shape_function_gradients(&xi)? {
        let (v, _) = node_kinematics(nodes, node, SOLID_PHASE)?;
        velocity_gradient += v * gradient.transpose();
    }
    particle.compute_strain(strain_rate_from_gradient(&velocity_gradient), dt);

    if let Some(material_id) = particle.material_id() {
        let material = materials.get(&material_id).ok_or(MpmError::UnknownEntity {
            kind: "material",
            id: material_id as Index,
        })?;
        particle.compute_stress(material.as_ref())?;
    }

    particle.compute_updated_position(dt);
    Ok(())
}

/// Gather onto every active, located particle.
pub fn gather<const D: usize>(
    mesh: &mut Mesh<D>,
    materials: &MaterialMap<D>,
    dt: Real,
    nphases: usize,
) -> MpmResult<()> {
    let (particles, cells, nodes) = mesh.split_particles_mut();
    particles
        .par_values_mut()
        .filter(|particle| particle.status())
        .try_for_each(|particle| {
            match particle.cell_id().and_then(|id| cells.get(&id)) {
                Some(cell) => {
                    update_particle(particle.as_mut(), cell, nodes, materials, dt, nphases)
                }
                None => Ok(()),
            }
        })
}
