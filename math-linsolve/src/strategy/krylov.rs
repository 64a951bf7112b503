//! Iterative-Krylov adapter
//!
//! Restarted GMRES with left preconditioning on the CSR form of `A`. The
//! iteration budget counts inner iterations across restarts. When it runs
//! out above tolerance the last iterate is returned inside
//! [`LinsolveError::NotConverged`] together with its true relative residual
//! `||b - A x|| / ||b||`.

use super::validate_system;
use crate::blas_helpers::vector_norm;
use crate::config::{KrylovConfig, KrylovPreconditioner};
use crate::context::ExecutionContext;
use crate::error::{LinsolveError, Result};
use crate::iterative::{GmresConfig, GmresSolution, gmres_preconditioned};
use crate::preconditioners::{DiagonalPreconditioner, IdentityPreconditioner};
use crate::sparse::CsrMatrix;
use crate::traits::LinearOperator;
use ndarray::Array1;

/// CSR operator whose products run on the execution context
struct ContextCsr<'a> {
    matrix: &'a CsrMatrix<f64>,
    ctx: &'a ExecutionContext,
}

impl LinearOperator<f64> for ContextCsr<'_> {
    fn num_rows(&self) -> usize {
        self.matrix.num_rows
    }

    fn num_cols(&self) -> usize {
        self.matrix.num_cols
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.matrix.matvec_in(self.ctx, x)
    }
}

/// Solves with preconditioned GMRES(m)
#[derive(Debug, Clone)]
pub struct KrylovAdapter<'ctx> {
    ctx: &'ctx ExecutionContext,
    config: KrylovConfig,
}

impl<'ctx> KrylovAdapter<'ctx> {
    /// Adapter running on `ctx` with the given iteration settings
    pub fn new(ctx: &'ctx ExecutionContext, config: KrylovConfig) -> Self {
        Self { ctx, config }
    }

    /// Solve the row-major system `A x = b`
    pub fn solve(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        validate_system(a, b, n)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let matrix = CsrMatrix::from_dense_slice(a, n)?;
        let operator = ContextCsr {
            matrix: &matrix,
            ctx: self.ctx,
        };
        let rhs = Array1::from_vec(b.to_vec());
        let gmres_config = GmresConfig::from(&self.config);

        let solution: GmresSolution<f64> = match self.config.preconditioner {
            KrylovPreconditioner::Jacobi => {
                let precond = DiagonalPreconditioner::from_csr(&matrix);
                gmres_preconditioned(&operator, &precond, &rhs, &gmres_config)
            }
            KrylovPreconditioner::None => {
                gmres_preconditioned(&operator, &IdentityPreconditioner, &rhs, &gmres_config)
            }
        };

        if solution.converged {
            log::debug!(
                "GMRES(m = {}) converged in {} iterations",
                self.config.restart,
                solution.iterations
            );
            return Ok(solution.x.to_vec());
        }

        let b_norm = vector_norm(&rhs);
        let r = &rhs - &operator.apply(&solution.x);
        let residual = if b_norm > 0.0 {
            vector_norm(&r) / b_norm
        } else {
            vector_norm(&r)
        };
        log::warn!(
            "GMRES stopped after {} iterations with relative residual {:.3e}",
            solution.iterations,
            residual
        );
        Err(LinsolveError::NotConverged {
            iterations: solution.iterations,
            residual,
            iterate: solution.x.to_vec(),
        })
    }
}
