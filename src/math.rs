use nalgebra::{SMatrix, SVector};

use crate::config::constants::VOIGT_SIZE;

pub type Real = f64;

/// Global index type for particles, nodes and cells.
pub type Index = u64;

pub type Vector<const D: usize> = SVector<Real, D>;
pub type Matrix<const D: usize> = SMatrix<Real, D, D>;

/// Symmetric tensor in Voigt order `[xx, yy, zz, xy, yz, xz]`.
pub type Voigt = SVector<Real, VOIGT_SIZE>;

#[inline(always)]
pub fn zero_vector<const D: usize>() -> Vector<D> {
    Vector::<D>::zeros()
}

#[inline(always)]
pub fn zero_voigt() -> Voigt {
    Voigt::zeros()
}

#[inline(always)]
pub fn voigt_trace(tensor: &Voigt) -> Real {
    tensor[0] + tensor[1] + tensor[2]
}

/// Determinant of a small square matrix; closed form up to 3x3, Gaussian
/// elimination with partial pivoting beyond.
pub fn determinant<const D: usize>(m: &Matrix<D>) -> Real {
    match D {
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        3 => {
            m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
                - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
                + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
        }
        _ => {
            let mut a = *m;
            let mut det = 1.0;
            for col in 0..D {
                let pivot = (col..D)
                    .max_by(|&i, &j| a[(i, col)].abs().total_cmp(&a[(j, col)].abs()))
                    .unwrap_or(col);
                if a[(pivot, col)] == 0.0 {
                    return 0.0;
                }
                if pivot != col {
                    a.swap_rows(pivot, col);
                    det = -det;
                }
                det *= a[(col, col)];
                for row in col + 1..D {
                    let factor = a[(row, col)] / a[(col, col)];
                    for k in col..D {
                        a[(row, k)] -= factor * a[(col, k)];
                    }
                }
            }
            det
        }
    }
}

/// Symmetric part of a velocity gradient `L` as an engineering strain rate
/// (shear components are `2 * eps_ij`).
pub fn strain_rate_from_gradient<const D: usize>(gradient: &Matrix<D>) -> Voigt {
    let mut rate = zero_voigt();
    for i in 0..D {
        rate[i] = gradient[(i, i)];
    }
    if D >= 2 {
        rate[3] = gradient[(0, 1)] + gradient[(1, 0)];
    }
    if D >= 3 {
        rate[4] = gradient[(1, 2)] + gradient[(2, 1)];
        rate[5] = gradient[(0, 2)] + gradient[(2, 0)];
    }
    rate
}

/// Traction-like product `sigma * n` for a Voigt stress and a D-vector.
pub fn stress_dot<const D: usize>(stress: &Voigt, n: &Vector<D>) -> Vector<D> {
    let mut result = zero_vector::<D>();
    match D {
        1 => {
            result[0] = stress[0] * n[0];
        }
        2 => {
            result[0] = stress[0] * n[0] + stress[3] * n[1];
            result[1] = stress[3] * n[0] + stress[1] * n[1];
        }
        _ => {
            result[0] = stress[0] * n[0] + stress[3] * n[1] + stress[5] * n[2];
            result[1] = stress[3] * n[0] + stress[1] * n[1] + stress[4] * n[2];
            result[2] = stress[5] * n[0] + stress[4] * n[1] + stress[2] * n[2];
        }
    }
    result
}

/// Copy a slice into a fixed-size vector, checking its length.
pub fn vector_from_slice<const N: usize>(
    values: &[Real],
) -> Result<SVector<Real, N>, crate::error::MpmError> {
    if values.len() != N {
        return Err(crate::error::MpmError::DimensionMismatch {
            expected: N,
            actual: values.len(),
        });
    }
    Ok(SVector::<Real, N>::from_column_slice(values))
}
