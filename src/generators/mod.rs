//! Initial particle coordinates

pub mod point_generator;
pub mod reader;

pub use point_generator::{
    FilePointGenerator, GaussPointGenerator, PointGenerator, RandomPointGenerator,
};
pub use reader::{AsciiPointReader, PointReader};
