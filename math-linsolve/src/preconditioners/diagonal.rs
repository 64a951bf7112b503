//! Diagonal (Jacobi) preconditioner
//!
//! Scales each residual component by the inverse of the matching diagonal
//! entry of A. A zero diagonal entry leaves its component unscaled.

use crate::sparse::CsrMatrix;
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

/// Diagonal (Jacobi) preconditioner
///
/// M = diag(A), so M^(-1) scales each component by 1/A_ii
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner<T: RealField> {
    /// Inverse diagonal elements
    inv_diag: Array1<T>,
}

fn invert_or_one<T: RealField>(d: T) -> T {
    if d.abs() > T::lit(1e-30) {
        d.recip()
    } else {
        T::one()
    }
}

impl<T: RealField> DiagonalPreconditioner<T> {
    /// Create a diagonal preconditioner from a CSR matrix
    pub fn from_csr(matrix: &CsrMatrix<T>) -> Self {
        Self::from_diagonal(&matrix.diagonal())
    }

    /// Create from a diagonal vector directly
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        Self {
            inv_diag: diag.mapv(invert_or_one),
        }
    }

    /// Inverse diagonal applied by this preconditioner
    pub fn inverse_diagonal(&self) -> &Array1<T> {
        &self.inv_diag
    }
}

impl<T: RealField> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r * &self.inv_diag
    }
}
