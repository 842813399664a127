use crate::core::Mesh;
use crate::error::{MpmError, MpmResult};
use crate::loads::NodalLoad;
use crate::math::Real;

/// Add every nodal load, evaluated at `time`, to the external forces.
pub fn apply_nodal_loads<const D: usize>(
    mesh: &mut Mesh<D>,
    loads: &[NodalLoad],
    time: Real,
) -> MpmResult<()> {
    for load in loads {
        let node = mesh.node_mut(load.node).ok_or(MpmError::UnknownEntity {
            kind: "node",
            id: load.node,
        })?;
        load.apply(node, time)?;
    }
    Ok(())
}

/// Node velocities from the scattered momentum.
pub fn compute_nodal_velocities<const D: usize>(
    mesh: &mut Mesh<D>,
    nphases: usize,
) -> MpmResult<()> {
    mesh.iterate_nodes(|node| {
        (0..nphases.min(node.nphases())).try_for_each(|phase| node.compute_velocity(phase))
    })
}

/// Explicit update of node acceleration and velocity, constraints last.
pub fn integrate_nodes<const D: usize>(
    mesh: &mut Mesh<D>,
    dt: Real,
    damping: Real,
    nphases: usize,
) -> MpmResult<()> {
    mesh.iterate_nodes(|node| {
        (0..nphases.min(node.nphases()))
            .try_for_each(|phase| node.compute_acceleration_velocity(phase, dt, damping))
    })
}
