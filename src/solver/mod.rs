//! Timestep phases
//!
//! Scatter, node solve and gather operate on a [`crate::core::Mesh`] and
//! must run in that order; none of them starts before the previous one has
//! finished.

pub mod g2p;
pub mod grid_update;
pub mod p2g;

pub use g2p::{MaterialMap, gather, update_particle};
pub use grid_update::{apply_nodal_loads, compute_nodal_velocities, integrate_nodes};
pub use p2g::{NodeContribution, particle_contributions, scatter};
