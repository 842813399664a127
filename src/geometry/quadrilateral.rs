use crate::error::MpmResult;
use crate::geometry::element::{Element, tensor_gauss};
use crate::math::{Real, Vector};

/// Local coordinates of the four corners, counter-clockwise from (-1, -1).
const CORNERS: [[Real; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// Bilinear 4-node quadrilateral on [-1, 1]^2.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quadrilateral4;

impl Element<2> for Quadrilateral4 {
    fn name(&self) -> &'static str {
        "ED2Q4"
    }

    fn nfunctions(&self) -> usize {
        4
    }

    fn shapefn(&self, xi: &Vector<2>) -> Vec<Real> {
        CORNERS
            .iter()
            .map(|c| 0.25 * (1.0 + c[0] * xi[0]) * (1.0 + c[1] * xi[1]))
            .collect()
    }

    fn grad_shapefn(&self, xi: &Vector<2>) -> Vec<Vector<2>> {
        CORNERS
            .iter()
            .map(|c| {
                Vector::<2>::new(
                    0.25 * c[0] * (1.0 + c[1] * xi[1]),
                    0.25 * c[1] * (1.0 + c[0] * xi[0]),
                )
            })
            .collect()
    }

    fn is_inside_reference(&self, xi: &Vector<2>, tolerance: Real) -> bool {
        xi.iter().all(|v| v.abs() <= 1.0 + tolerance)
    }

    fn project_to_reference(&self, xi: &Vector<2>) -> Vector<2> {
        xi.map(|v| v.clamp(-1.0, 1.0))
    }

    fn centre(&self) -> Vector<2> {
        Vector::<2>::zeros()
    }

    fn quadrature(&self, npoints: usize) -> MpmResult<Vec<(Vector<2>, Real)>> {
        tensor_gauss::<2>(npoints)
    }
}
