//! Reference elements and mesh generation helpers

pub mod element;
pub mod hexahedron;
pub mod quadrilateral;
pub mod structured;
pub mod triangle;

pub use element::{Element, gauss_legendre, tensor_gauss};
pub use hexahedron::Hexahedron8;
pub use quadrilateral::Quadrilateral4;
pub use structured::StructuredGrid;
pub use triangle::Triangle3;
