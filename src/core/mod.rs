pub mod cell;
pub mod checkpoint;
pub mod mesh;
pub mod mpm_state;
pub mod node;
pub mod particle;

pub use cell::Cell;
pub use checkpoint::{CheckpointHeader, ParticleRecord, restore_particle};
pub use mesh::{CellMap, Mesh, NodeMap, ParticleMap};
pub use mpm_state::{MpmState, RunSummary};
pub use node::{Node, NodeBase};
pub use particle::{Particle, ParticleBase};
