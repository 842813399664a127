use crate::error::MpmResult;
use crate::geometry::element::{Element, tensor_gauss};
use crate::math::{Real, Vector};

/// Bottom face (zeta = -1) counter-clockwise, then the top face.
const CORNERS: [[Real; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Trilinear 8-node hexahedron on [-1, 1]^3.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hexahedron8;

impl Element<3> for Hexahedron8 {
    fn name(&self) -> &'static str {
        "ED3H8"
    }

    fn nfunctions(&self) -> usize {
        8
    }

    fn shapefn(&self, xi: &Vector<3>) -> Vec<Real> {
        CORNERS
            .iter()
            .map(|c| {
                0.125 * (1.0 + c[0] * xi[0]) * (1.0 + c[1] * xi[1]) * (1.0 + c[2] * xi[2])
            })
            .collect()
    }

    fn grad_shapefn(&self, xi: &Vector<3>) -> Vec<Vector<3>> {
        CORNERS
            .iter()
            .map(|c| {
                let a = 1.0 + c[0] * xi[0];
                let b = 1.0 + c[1] * xi[1];
                let d = 1.0 + c[2] * xi[2];
                Vector::<3>::new(
                    0.125 * c[0] * b * d,
                    0.125 * c[1] * a * d,
                    0.125 * c[2] * a * b,
                )
            })
            .collect()
    }

    fn is_inside_reference(&self, xi: &Vector<3>, tolerance: Real) -> bool {
        xi.iter().all(|v| v.abs() <= 1.0 + tolerance)
    }

    fn project_to_reference(&self, xi: &Vector<3>) -> Vector<3> {
        xi.map(|v| v.clamp(-1.0, 1.0))
    }

    fn centre(&self) -> Vector<3> {
        Vector::<3>::zeros()
    }

    fn quadrature(&self, npoints: usize) -> MpmResult<Vec<(Vector<3>, Real)>> {
        tensor_gauss::<3>(npoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn partition_of_unity() {
        let xi = Vector::<3>::new(0.1, -0.4, 0.8);
        let sum: Real = Hexahedron8.shapefn(&xi).iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-14);
        let grad: Vector<3> = Hexahedron8.grad_shapefn(&xi).iter().sum();
        assert_relative_eq!(grad.norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn node_seven_is_the_far_corner() {
        let n = Hexahedron8.shapefn(&Vector::<3>::new(1.0, 1.0, 1.0));
        assert_relative_eq!(n[6], 1.0);
        assert_relative_eq!(n.iter().sum::<Real>(), 1.0);
    }
}
