//! Material point method core
//!
//! Particles, nodes and cells with their scatter/gather coupling, a runtime
//! registry that builds them from string keys, and a Bevy plugin that runs
//! the explicit timestep.

pub mod config;
pub mod core;
pub mod error;
pub mod generators;
pub mod geometry;
pub mod loads;
pub mod materials;
pub mod math;
pub mod plugin;
pub mod registry;
pub mod solver;

// Public re-exports for clean API
pub use crate::config::{NodeSetConfig, ParticleSetConfig, SolverParams};
pub use crate::core::{
    Cell, Mesh, MpmState, Node, NodeBase, Particle, ParticleBase, RunSummary,
};
pub use crate::error::{MpmError, MpmResult};
pub use crate::plugin::MpmPlugin;
pub use crate::registry::{Registry, register_defaults};
