//! Direct solvers for linear systems
//!
//! - [`lu_solve`]: LU decomposition with partial pivoting on `ndarray` matrices
//! - [`solve_reference`]: the same solver on flat row-major buffers

mod lu;

pub use lu::{LuFactorization, lu_factorize, lu_solve};

use crate::error::{LinsolveError, Result, ensure_len, ensure_square_len};
use ndarray::{Array1, Array2};

/// Solve a row-major n×n system with the reference LU solver.
///
/// The caller's buffers are only read; the factorization works on a copy.
pub fn solve_reference(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    let len = ensure_square_len("A", n, a.len())?;
    ensure_len("b", n, b.len())?;
    if n == 0 {
        return Ok(Vec::new());
    }

    // Row-major is ndarray's default layout, so this is a plain copy
    let matrix =
        Array2::from_shape_vec((n, n), a.to_vec()).map_err(|_| LinsolveError::SizeMismatch {
            what: "A",
            expected: len,
            got: a.len(),
        })?;
    let rhs = Array1::from_vec(b.to_vec());

    let x = lu_solve(&matrix, &rhs)?;
    Ok(x.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_reference_2x2() {
        let x = solve_reference(&[4.0, 3.0, 6.0, 3.0], &[1.0, 2.0], 2).unwrap();
        assert_relative_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(x[1], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_reference_scalar() {
        let x = solve_reference(&[4.0], &[2.0], 1).unwrap();
        assert_eq!(x, vec![0.5]);
    }

    #[test]
    fn test_solve_reference_empty() {
        assert!(solve_reference(&[], &[], 0).unwrap().is_empty());
    }

    #[test]
    fn test_solve_reference_size_checks() {
        assert!(matches!(
            solve_reference(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2),
            Err(LinsolveError::SizeMismatch { what: "A", .. })
        ));
        assert!(matches!(
            solve_reference(&[1.0, 2.0, 3.0, 4.0], &[1.0], 2),
            Err(LinsolveError::SizeMismatch { what: "b", .. })
        ));
    }
}
