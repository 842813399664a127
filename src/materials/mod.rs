//! Constitutive models
//!
//! Materials turn a particle's strain increment into a stress update. Only
//! linear elasticity ships built in; further models plug in through the
//! registry under the `Material<D>` base.

pub mod linear_elastic;
pub mod material;
pub mod utils;

pub use linear_elastic::LinearElastic;
pub use material::{Material, MaterialProperties};

pub use utils::check;
pub use utils::physics;
