//! LU decomposition solver
//!
//! LU factorization with partial pivoting for dense square systems, in pure
//! Rust. This is the reference solver: it needs no engine and every other
//! strategy is checked against it.

use crate::error::{LinsolveError, Result, ensure_len};
use crate::traits::RealField;
use ndarray::{Array1, Array2};

/// LU factorization result
///
/// Stores L and U factors along with pivot information
#[derive(Debug, Clone)]
pub struct LuFactorization<T: RealField> {
    /// Combined L and U matrices (L is unit lower triangular, stored below diagonal)
    pub lu: Array2<T>,
    /// Row exchanged with row `k` at elimination step `k`
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: RealField> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed LU factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        ensure_len("b", self.n, b.len())?;

        let mut x = b.clone();

        // Apply the row exchanges in elimination order: Pb
        for (k, &p) in self.pivots.iter().enumerate() {
            if p != k {
                x.swap(k, p);
            }
        }

        // Forward substitution: Ly = Pb
        for i in 0..self.n {
            for j in 0..i {
                let l_ij = self.lu[[i, j]];
                x[i] = x[i] - l_ij * x[j];
            }
        }

        // Backward substitution: Ux = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                let u_ij = self.lu[[i, j]];
                x[i] = x[i] - u_ij * x[j];
            }
            x[i] /= self.lu[[i, i]];
        }

        Ok(x)
    }

    /// Determinant of the factored matrix
    pub fn determinant(&self) -> T {
        let swaps = self
            .pivots
            .iter()
            .enumerate()
            .filter(|&(k, &p)| p != k)
            .count();
        let det = (0..self.n).fold(T::one(), |acc, i| acc * self.lu[[i, i]]);
        if swaps % 2 == 0 { det } else { -det }
    }
}

/// Compute LU factorization with partial pivoting
///
/// A pivot whose magnitude does not exceed `ε · max|A|` after the row
/// exchange is rejected with [`LinsolveError::SingularMatrix`].
pub fn lu_factorize<T: RealField>(a: &Array2<T>) -> Result<LuFactorization<T>> {
    let n = a.nrows();
    ensure_len("A columns", n, a.ncols())?;

    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..n).collect();

    let scale = lu.iter().fold(T::zero(), |m, v| m.max(v.abs()));
    let tolerance = scale * T::epsilon();

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].abs();
        let mut max_row = k;

        for i in (k + 1)..n {
            let val = lu[[i, k]].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        // Check for singularity
        if max_val <= tolerance || max_val.is_nan() {
            return Err(LinsolveError::SingularMatrix {
                pivot: k,
                value: max_val.to_report(),
            });
        }

        // Swap rows if needed
        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
        }
        pivots[k] = max_row;

        // Compute multipliers and eliminate
        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let mult = lu[[i, k]] / pivot;
            lu[[i, k]] = mult; // Store multiplier in L part

            if mult == T::zero() {
                continue;
            }
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: RealField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    ensure_len("b", a.nrows(), b.len())?;
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}
