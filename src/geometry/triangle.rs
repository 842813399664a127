use crate::error::{MpmError, MpmResult};
use crate::geometry::element::Element;
use crate::math::{Real, Vector};

/// Linear 3-node triangle on the unit simplex (0,0), (1,0), (0,1).
#[derive(Clone, Copy, Debug, Default)]
pub struct Triangle3;

impl Element<2> for Triangle3 {
    fn name(&self) -> &'static str {
        "ED2T3"
    }

    fn nfunctions(&self) -> usize {
        3
    }

    fn shapefn(&self, xi: &Vector<2>) -> Vec<Real> {
        vec![1.0 - xi[0] - xi[1], xi[0], xi[1]]
    }

    fn grad_shapefn(&self, _xi: &Vector<2>) -> Vec<Vector<2>> {
        vec![
            Vector::<2>::new(-1.0, -1.0),
            Vector::<2>::new(1.0, 0.0),
            Vector::<2>::new(0.0, 1.0),
        ]
    }

    fn is_inside_reference(&self, xi: &Vector<2>, tolerance: Real) -> bool {
        xi[0] >= -tolerance && xi[1] >= -tolerance && xi[0] + xi[1] <= 1.0 + tolerance
    }

    fn project_to_reference(&self, xi: &Vector<2>) -> Vector<2> {
        let mut p = xi.map(|v| v.max(0.0));
        let sum = p[0] + p[1];
        if sum > 1.0 {
            p /= sum;
        }
        p
    }

    fn centre(&self) -> Vector<2> {
        Vector::<2>::new(1.0 / 3.0, 1.0 / 3.0)
    }

    fn quadrature(&self, npoints: usize) -> MpmResult<Vec<(Vector<2>, Real)>> {
        match npoints {
            1 => Ok(vec![(self.centre(), 0.5)]),
            3 => Ok(vec![
                (Vector::<2>::new(1.0 / 6.0, 1.0 / 6.0), 1.0 / 6.0),
                (Vector::<2>::new(2.0 / 3.0, 1.0 / 6.0), 1.0 / 6.0),
                (Vector::<2>::new(1.0 / 6.0, 2.0 / 3.0), 1.0 / 6.0),
            ]),
            n => Err(MpmError::config(format!(
                "triangle quadrature supports 1 or 3 points, got {n}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_lands_on_the_simplex() {
        let p = Triangle3.project_to_reference(&Vector::<2>::new(0.9, 0.6));
        assert!(Triangle3.is_inside_reference(&p, 1e-14));
        assert_relative_eq!(p[0] + p[1], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn quadrature_weights_sum_to_area() {
        for n in [1, 3] {
            let area: Real = Triangle3.quadrature(n).unwrap().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(area, 0.5, epsilon = 1e-14);
        }
    }
}
