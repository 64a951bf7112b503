//! Core traits for the solver engines
//!
//! - [`RealField`]: scalar types the engines are generic over (`f64`, `f32`)
//! - [`LinearOperator`]: anything that can compute `y = A x`
//! - [`Preconditioner`]: an approximation of `A⁻¹` for Krylov methods

use ndarray::Array1;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::Debug;

/// Trait for real scalar types used by the factorization and Krylov engines.
pub trait RealField:
    Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static
{
    /// Convert an `f64` constant (tolerance, threshold) into this type.
    fn lit(value: f64) -> Self;

    /// Lossy conversion to `f64` for reporting.
    fn to_report(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl RealField for f64 {
    #[inline]
    fn lit(value: f64) -> Self {
        value
    }
}

impl RealField for f32 {
    #[inline]
    fn lit(value: f64) -> Self {
        value as f32
    }
}

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// Krylov solvers only see this trait, so a sparse matrix, a dense matrix or
/// a context-bound wrapper can be used interchangeably.
pub trait LinearOperator<T: RealField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that M*A is better conditioned
/// than A alone.
pub trait Preconditioner<T: RealField>: Send + Sync {
    /// Apply the preconditioner: y = M * r
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl<T: RealField> Preconditioner<T> for IdentityPreconditioner {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_lit() {
        assert_relative_eq!(<f64 as RealField>::lit(1e-6), 1e-6);
        assert_relative_eq!(<f32 as RealField>::lit(0.5), 0.5_f32);
    }

    #[test]
    fn test_identity_preconditioner() {
        let precond = IdentityPreconditioner;
        let r = array![1.0_f64, -2.0, 3.5];
        let y = precond.apply(&r);
        assert_eq!(r, y);
    }
}
