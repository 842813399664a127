//! Configuration and parameters
//!
//! Constants, solver settings and the entity-set descriptions that drive
//! registry construction.

pub mod constants;
pub mod entity;
pub mod solver_params;

pub use constants::*;
pub use entity::*;
pub use solver_params::*;
