//! Entity-set descriptions.
//!
//! These mirror one entry of an external input file: a registry key plus the
//! dimension it is meant for. Parsing the file itself happens elsewhere.

use crate::error::{MpmError, MpmResult};

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSetConfig {
    /// Registry key, e.g. `"P2D"`
    pub particle_type: String,
    pub dimension: usize,
    /// Material applied to every particle of the set
    pub material_id: Option<usize>,
}

impl ParticleSetConfig {
    pub fn new(particle_type: &str, dimension: usize) -> Self {
        Self {
            particle_type: particle_type.to_owned(),
            dimension,
            material_id: None,
        }
    }

    pub fn with_material(mut self, material_id: usize) -> Self {
        self.material_id = Some(material_id);
        self
    }

    pub fn check_dimension<const D: usize>(&self) -> MpmResult<()> {
        check_dimension::<D>("particle set", &self.particle_type, self.dimension)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSetConfig {
    /// Registry key, e.g. `"Node2D"`
    pub node_type: String,
    pub dimension: usize,
}

impl NodeSetConfig {
    pub fn new(node_type: &str, dimension: usize) -> Self {
        Self {
            node_type: node_type.to_owned(),
            dimension,
        }
    }

    pub fn check_dimension<const D: usize>(&self) -> MpmResult<()> {
        check_dimension::<D>("node set", &self.node_type, self.dimension)
    }
}

fn check_dimension<const D: usize>(what: &str, key: &str, dimension: usize) -> MpmResult<()> {
    if dimension == D {
        Ok(())
    } else {
        Err(MpmError::config(format!(
            "{what} `{key}` declares dimension {dimension} for a {D}D mesh"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_must_match_mesh() {
        assert!(ParticleSetConfig::new("P2D", 2).check_dimension::<2>().is_ok());
        assert!(ParticleSetConfig::new("P2D", 2).check_dimension::<3>().is_err());
        assert!(NodeSetConfig::new("Node3D", 3).check_dimension::<3>().is_ok());
    }
}
