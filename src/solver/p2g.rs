//! Particle-to-node (P2G) transfer
//!
//! Contributions are evaluated in parallel, one particle at a time, and then
//! merged into the nodes serially in particle order. The sum each node sees
//! therefore does not depend on thread scheduling.

use rayon::prelude::*;

use crate::core::{Cell, Mesh, ParticleBase};
use crate::error::{MpmError, MpmResult};
use crate::math::{Index, Real, Vector, stress_dot};

/// What one particle adds to one node for one phase.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeContribution<const D: usize> {
    pub node: Index,
    pub phase: usize,
    pub mass: Real,
    pub momentum: Vector<D>,
    pub external_force: Vector<D>,
    pub internal_force: Vector<D>,
}

/// Weighted mass, momentum, body force `m N g` and internal force
/// `-V sigma . grad N` of `particle` for each node of `cell`.
pub fn particle_contributions<const D: usize>(
    particle: &dyn ParticleBase<D>,
    cell: &Cell<D>,
    gravity: &Vector<D>,
    nphases: usize,
) -> MpmResult<Vec<NodeContribution<D>>> {
    let xi = particle.local_coordinates();
    let weights = cell.shape_functions(&xi);
    let volume = particle.volume();
    let gradients = if volume > 0.0 {
        Some(cell.shape_function_gradients(&xi)?)
    } else {
        None
    };

    let nphases = nphases.min(particle.nphases());
    let mut contributions = Vec::with_capacity(weights.len() * nphases);
    for phase in 0..nphases {
        let mass = particle.mass(phase)?;
        let momentum = particle.momentum(phase)?;
        let stress = particle.stress(phase)?;
        for (i, &(node, weight)) in weights.iter().enumerate() {
            let internal_force = match &gradients {
                Some(gradients) => -volume * stress_dot(&stress, &gradients[i].1),
                None => Vector::<D>::zeros(),
            };
            contributions.push(NodeContribution {
                node,
                phase,
                mass: weight * mass,
                momentum: momentum * weight,
                external_force: gravity * (weight * mass),
                internal_force,
            });
        }
    }
    Ok(contributions)
}

/// Scatter every active, located particle onto the nodes. Nodes must have
/// been reset beforehand.
pub fn scatter<const D: usize>(
    mesh: &mut Mesh<D>,
    gravity: &Vector<D>,
    nphases: usize,
) -> MpmResult<()> {
    let contributions = {
        let mesh: &Mesh<D> = mesh;
        mesh.particle_map()
            .par_values()
            .filter(|particle| particle.status())
            .map(|particle| match particle.cell_id().and_then(|id| mesh.cell(id)) {
                Some(cell) => particle_contributions(particle.as_ref(), cell, gravity, nphases),
                None => Ok(Vec::new()),
            })
            .collect::<MpmResult<Vec<_>>>()?
    };

    for contribution in contributions.into_iter().flatten() {
        let node = mesh
            .node_mut(contribution.node)
            .ok_or(MpmError::UnknownEntity {
                kind: "node",
                id: contribution.node,
            })?;
        node.update_mass(contribution.phase, contribution.mass)?;
        node.update_momentum(contribution.phase, contribution.momentum.as_slice())?;
        node.update_external_force(contribution.phase, contribution.external_force.as_slice())?;
        node.update_internal_force(contribution.phase, contribution.internal_force.as_slice())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::Particle;
    use crate::geometry::Quadrilateral4;
    use approx::assert_relative_eq;

    fn cell() -> Cell<2> {
        Cell::new(
            0,
            Arc::new(Quadrilateral4),
            &[
                (0, Vector::<2>::new(0.0, 0.0)),
                (1, Vector::<2>::new(1.0, 0.0)),
                (2, Vector::<2>::new(1.0, 1.0)),
                (3, Vector::<2>::new(0.0, 1.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn uniform_stress_has_no_net_internal_force() {
        let cell = cell();
        let mut particle = Particle::<2, 1>::new(0, Vector::<2>::new(0.3, 0.6));
        assert!(particle.assign_cell(&cell));
        particle.assign_volume(0.5);
        particle.assign_mass(0, 1.0).unwrap();
        particle.assign_stress(0, &[10.0, -4.0, 0.0, 2.0, 0.0, 0.0]).unwrap();

        let contributions =
            particle_contributions(&particle, &cell, &Vector::<2>::new(0.0, -10.0), 1).unwrap();
        let net: Vector<2> = contributions.iter().map(|c| c.internal_force).sum();
        assert_relative_eq!(net.norm(), 0.0, epsilon = 1e-12);

        let weight: Vector<2> = contributions.iter().map(|c| c.external_force).sum();
        assert_relative_eq!(weight, Vector::<2>::new(0.0, -10.0), epsilon = 1e-12);
    }

    #[test]
    fn phases_beyond_the_solver_count_are_skipped() {
        let cell = cell();
        let mut particle = Particle::<2, 2>::new(0, Vector::<2>::new(0.5, 0.5));
        assert!(particle.assign_cell(&cell));
        particle.assign_mass(1, 3.0).unwrap();

        let contributions =
            particle_contributions(&particle, &cell, &Vector::<2>::zeros(), 1).unwrap();
        assert_eq!(contributions.len(), 4);
        assert!(contributions.iter().all(|c| c.phase == 0));
    }
}
