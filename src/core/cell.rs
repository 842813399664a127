//! Grid cells
//!
//! A cell binds an element's reference shape functions to the physical
//! coordinates of its nodes. Its node set is fixed at construction; only the
//! neighbour list is filled in later by the mesh.

use std::sync::Arc;

use crate::config::constants::{
    LOCAL_COORDINATE_RESIDUAL, LOCAL_COORDINATE_TOLERANCE, NEWTON_MAX_ITERATIONS,
    NEWTON_TOLERANCE,
};
use crate::error::{MpmError, MpmResult};
use crate::geometry::Element;
use crate::math::{Index, Matrix, Real, Vector, determinant};

#[derive(Clone)]
pub struct Cell<const D: usize> {
    id: Index,
    node_ids: Vec<Index>,
    node_coordinates: Vec<Vector<D>>,
    element: Arc<dyn Element<D>>,
    neighbours: Vec<Index>,
    /// Bounding-box diagonal, the length scale of the inverse-map residual.
    size: Real,
}

impl<const D: usize> Cell<D> {
    /// `nodes` must be ordered as the element expects.
    pub fn new(
        id: Index,
        element: Arc<dyn Element<D>>,
        nodes: &[(Index, Vector<D>)],
    ) -> MpmResult<Self> {
        if nodes.len() != element.nfunctions() {
            return Err(MpmError::DimensionMismatch {
                expected: element.nfunctions(),
                actual: nodes.len(),
            });
        }
        let node_coordinates: Vec<Vector<D>> = nodes.iter().map(|(_, x)| *x).collect();
        let size = match node_coordinates.split_first() {
            Some((first, rest)) => {
                let (lower, upper) = rest
                    .iter()
                    .fold((*first, *first), |(lo, hi), x| (lo.inf(x), hi.sup(x)));
                (upper - lower).norm()
            }
            None => 0.0,
        };
        Ok(Self {
            id,
            node_ids: nodes.iter().map(|(id, _)| *id).collect(),
            node_coordinates,
            element,
            neighbours: Vec::new(),
            size,
        })
    }

    pub fn id(&self) -> Index {
        self.id
    }

    pub fn nnodes(&self) -> usize {
        self.node_ids.len()
    }

    pub fn node_ids(&self) -> &[Index] {
        &self.node_ids
    }

    pub fn node_coordinates(&self) -> &[Vector<D>] {
        &self.node_coordinates
    }

    pub fn element(&self) -> &dyn Element<D> {
        self.element.as_ref()
    }

    /// Cells sharing at least one node, ascending by id.
    pub fn neighbours(&self) -> &[Index] {
        &self.neighbours
    }

    pub(crate) fn assign_neighbours(&mut self, neighbours: Vec<Index>) {
        self.neighbours = neighbours;
    }

    /// `J[a][b] = sum_i x_i[a] * dN_i/dxi_b`
    pub fn jacobian(&self, xi: &Vector<D>) -> Matrix<D> {
        let mut jacobian = Matrix::<D>::zeros();
        for (x, grad) in self
            .node_coordinates
            .iter()
            .zip(self.element.grad_shapefn(xi))
        {
            jacobian += x * grad.transpose();
        }
        jacobian
    }

    pub fn global_coordinates(&self, xi: &Vector<D>) -> Vector<D> {
        self.node_coordinates
            .iter()
            .zip(self.element.shapefn(xi))
            .fold(Vector::<D>::zeros(), |acc, (x, n)| acc + x * n)
    }

    pub fn centroid(&self) -> Vector<D> {
        self.global_coordinates(&self.element.centre())
    }

    /// Inverse isoparametric map by Newton iteration from the element centre.
    ///
    /// Returns `None` when the Jacobian turns singular or the iteration does
    /// not converge onto `point`. A converged result may still lie outside
    /// the reference domain; see [`Cell::point_in_cell`].
    pub fn local_coordinates(&self, point: &Vector<D>) -> Option<Vector<D>> {
        let tolerance = LOCAL_COORDINATE_RESIDUAL * self.size;
        let mut xi = self.element.centre();
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let residual = self.global_coordinates(&xi) - point;
            if residual.norm() <= tolerance {
                return Some(xi);
            }
            let step = self.jacobian(&xi).try_inverse()? * residual;
            xi -= step;
            if step.norm() < NEWTON_TOLERANCE {
                break;
            }
        }
        // A stalled step is only a solution if it actually maps onto `point`.
        ((self.global_coordinates(&xi) - point).norm() <= tolerance).then_some(xi)
    }

    pub fn point_in_cell(&self, point: &Vector<D>) -> bool {
        self.local_coordinates(point).is_some_and(|xi| {
            self.element
                .is_inside_reference(&xi, LOCAL_COORDINATE_TOLERANCE)
        })
    }

    /// Local coordinates of a point accepted by [`Cell::point_in_cell`],
    /// projected onto the reference domain so that every weight is
    /// non-negative.
    pub fn contained_local_coordinates(&self, point: &Vector<D>) -> Option<Vector<D>> {
        self.local_coordinates(point)
            .filter(|xi| {
                self.element
                    .is_inside_reference(xi, LOCAL_COORDINATE_TOLERANCE)
            })
            .map(|xi| self.element.project_to_reference(&xi))
    }

    /// Ordered `(node id, weight)` pairs at local coordinates `xi`.
    pub fn shape_functions(&self, xi: &Vector<D>) -> Vec<(Index, Real)> {
        self.node_ids
            .iter()
            .copied()
            .zip(self.element.shapefn(xi))
            .collect()
    }

    /// Global gradients `dN/dx = J^{-T} dN/dxi` at local coordinates `xi`.
    pub fn shape_function_gradients(&self, xi: &Vector<D>) -> MpmResult<Vec<(Index, Vector<D>)>> {
        let inverse = self
            .jacobian(xi)
            .try_inverse()
            .ok_or_else(|| MpmError::config(format!("cell {} is degenerate", self.id)))?;
        let inverse_transpose = inverse.transpose();
        Ok(self
            .node_ids
            .iter()
            .copied()
            .zip(
                self.element
                    .grad_shapefn(xi)
                    .into_iter()
                    .map(|grad| inverse_transpose * grad),
            )
            .collect())
    }

    pub fn volume(&self) -> MpmResult<Real> {
        Ok(self
            .element
            .quadrature(3)?
            .iter()
            .map(|(xi, weight)| weight * determinant(&self.jacobian(xi)))
            .sum())
    }
}

impl<const D: usize> std::fmt::Debug for Cell<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("element", &self.element.name())
            .field("node_ids", &self.node_ids)
            .finish()
    }
}
