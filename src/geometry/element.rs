//! Reference elements
//!
//! An element knows its shape functions in local (reference) coordinates.
//! Mapping to physical space is the job of [`crate::core::Cell`], which owns
//! the node coordinates.

use crate::error::{MpmError, MpmResult};
use crate::math::{Real, Vector};

pub trait Element<const D: usize>: Send + Sync {
    /// Registry key of the element, e.g. `"ED2Q4"`
    fn name(&self) -> &'static str;

    /// Number of shape functions, equal to the number of cell nodes.
    fn nfunctions(&self) -> usize;

    /// Shape function values at `xi`, one per node.
    fn shapefn(&self, xi: &Vector<D>) -> Vec<Real>;

    /// Shape function gradients with respect to local coordinates.
    fn grad_shapefn(&self, xi: &Vector<D>) -> Vec<Vector<D>>;

    fn is_inside_reference(&self, xi: &Vector<D>, tolerance: Real) -> bool;

    /// Closest point of the reference domain.
    fn project_to_reference(&self, xi: &Vector<D>) -> Vector<D>;

    /// Local coordinates of the element centre, the start of the inverse map.
    fn centre(&self) -> Vector<D>;

    /// Quadrature points and weights in local coordinates.
    fn quadrature(&self, npoints: usize) -> MpmResult<Vec<(Vector<D>, Real)>>;
}

/// 1D Gauss-Legendre rule on [-1, 1].
pub fn gauss_legendre(npoints: usize) -> MpmResult<Vec<(Real, Real)>> {
    match npoints {
        1 => Ok(vec![(0.0, 2.0)]),
        2 => {
            let a = 1.0 / Real::sqrt(3.0);
            Ok(vec![(-a, 1.0), (a, 1.0)])
        }
        3 => {
            let a = Real::sqrt(3.0 / 5.0);
            Ok(vec![(-a, 5.0 / 9.0), (0.0, 8.0 / 9.0), (a, 5.0 / 9.0)])
        }
        n => Err(MpmError::config(format!(
            "{n}-point Gauss rule is not available (1 to 3)"
        ))),
    }
}

/// Tensor-product rule on [-1, 1]^D.
pub fn tensor_gauss<const D: usize>(npoints: usize) -> MpmResult<Vec<(Vector<D>, Real)>> {
    let rule = gauss_legendre(npoints)?;
    let mut points = vec![(Vector::<D>::zeros(), 1.0)];
    for axis in 0..D {
        let mut next = Vec::with_capacity(points.len() * rule.len());
        for (point, weight) in &points {
            for &(x, w) in &rule {
                let mut p = *point;
                p[axis] = x;
                next.push((p, weight * w));
            }
        }
        points = next;
    }
    Ok(points)
}
