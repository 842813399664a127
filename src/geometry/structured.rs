//! Rectangular background grids
//!
//! Nodes and cells are numbered lexicographically with the x index running
//! fastest, so ids follow directly from grid indices.

use crate::core::{Mesh, NodeBase};
use crate::error::{MpmError, MpmResult};
use crate::math::{Index, Real, Vector};
use crate::registry::{EntityArgs, Registry, create_element};

#[derive(Clone, Debug, PartialEq)]
pub struct StructuredGrid<const D: usize> {
    origin: Vector<D>,
    spacing: Vector<D>,
    divisions: [usize; D],
}

impl<const D: usize> StructuredGrid<D> {
    pub fn new(origin: Vector<D>, spacing: Vector<D>, divisions: [usize; D]) -> Self {
        Self {
            origin,
            spacing,
            divisions,
        }
    }

    pub fn nnodes(&self) -> usize {
        self.divisions.iter().map(|n| n + 1).product()
    }

    pub fn ncells(&self) -> usize {
        self.divisions.iter().product()
    }

    pub fn node_id(&self, index: [usize; D]) -> Index {
        let mut id = 0;
        let mut stride = 1;
        for axis in 0..D {
            id += index[axis] * stride;
            stride *= self.divisions[axis] + 1;
        }
        id as Index
    }

    pub fn cell_id(&self, index: [usize; D]) -> Index {
        let mut id = 0;
        let mut stride = 1;
        for axis in 0..D {
            id += index[axis] * stride;
            stride *= self.divisions[axis];
        }
        id as Index
    }

    /// Ids of the nodes on the lower (`upper == false`) or upper face
    /// normal to `axis`.
    pub fn face_nodes(&self, axis: usize, upper: bool) -> MpmResult<Vec<Index>> {
        if axis >= D {
            return Err(MpmError::config(format!(
                "face axis {axis} out of range for a {D}D grid"
            )));
        }
        let layer = if upper { self.divisions[axis] } else { 0 };
        Ok(grid_indices(self.divisions.map(|n| n + 1))
            .into_iter()
            .filter(|index| index[axis] == layer)
            .map(|index| self.node_id(index))
            .collect())
    }

    /// Build the mesh, creating nodes and the element through the registry.
    pub fn build(
        &self,
        registry: &Registry,
        node_type: &str,
        element_type: &str,
    ) -> MpmResult<Mesh<D>> {
        if D < 2 {
            return Err(MpmError::config(format!("structured grids need D >= 2, got {D}")));
        }
        if self.divisions.contains(&0) || self.spacing.iter().any(|h| !(*h > 0.0)) {
            return Err(MpmError::config(
                "structured grid needs positive divisions and spacing",
            ));
        }
        let element = create_element::<D>(registry, element_type)?;
        let corners = corner_offsets::<D>();
        if element.nfunctions() != corners.len() {
            return Err(MpmError::config(format!(
                "element `{}` has {} nodes, a structured cell has {}",
                element_type,
                element.nfunctions(),
                corners.len()
            )));
        }

        let mut mesh = Mesh::new();
        for index in grid_indices(self.divisions.map(|n| n + 1)) {
            let coordinates =
                self.origin + Vector::<D>::from_fn(|axis, _| index[axis] as Real * self.spacing[axis]);
            let node = registry.create::<dyn NodeBase<D>, EntityArgs<D>>(
                node_type,
                (self.node_id(index), coordinates),
            )?;
            mesh.add_node(node)?;
        }

        for index in grid_indices(self.divisions) {
            let node_ids: Vec<Index> = corners
                .iter()
                .map(|offset| {
                    let mut corner = index;
                    for axis in 0..D {
                        corner[axis] += offset[axis];
                    }
                    self.node_id(corner)
                })
                .collect();
            mesh.add_cell(self.cell_id(index), element.clone(), &node_ids)?;
        }
        mesh.compute_cell_neighbours();
        Ok(mesh)
    }
}

/// All indices below `extent`, x fastest.
fn grid_indices<const D: usize>(extent: [usize; D]) -> Vec<[usize; D]> {
    let total: usize = extent.iter().product();
    (0..total)
        .map(|mut flat| {
            let mut index = [0; D];
            for axis in 0..D {
                index[axis] = flat % extent[axis];
                flat /= extent[axis];
            }
            index
        })
        .collect()
}

/// Corner offsets in element node order: counter-clockwise in the xy plane,
/// one layer per remaining axis.
fn corner_offsets<const D: usize>() -> Vec<[usize; D]> {
    const QUAD: [[usize; 2]; 4] = [[0, 0], [1, 0], [1, 1], [0, 1]];
    let layers = 1usize << D.saturating_sub(2);
    let mut corners = Vec::with_capacity(4 * layers);
    for layer in 0..layers {
        for quad in QUAD {
            let mut corner = [0; D];
            corner[0] = quad[0];
            corner[1] = quad[1];
            for axis in 2..D {
                corner[axis] = (layer >> (axis - 2)) & 1;
            }
            corners.push(corner);
        }
    }
    corners
}
