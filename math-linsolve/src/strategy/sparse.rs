//! Direct-Sparse adapter
//!
//! Every entry of the dense input becomes a structural nonzero, so the
//! sparse engine does strictly more work than the dense one here. The
//! strategy exists for cross-checking backends and is never picked by the
//! size-based selection.

use super::{StrategyId, validate_system};
use crate::config::SparseConfig;
use crate::context::ExecutionContext;
use crate::engine::{SparseSolverFactory, SparseStatus};
use crate::error::{LinsolveError, Result};
use crate::sparse::CsrMatrix;

/// Solves through a solver created by [`SparseSolverFactory`]
#[derive(Debug, Clone)]
pub struct SparseAdapter<'ctx> {
    ctx: &'ctx ExecutionContext,
    config: SparseConfig,
}

impl<'ctx> SparseAdapter<'ctx> {
    /// Adapter running on `ctx` with the configured backend
    pub fn new(ctx: &'ctx ExecutionContext, config: SparseConfig) -> Self {
        Self { ctx, config }
    }

    /// Solve the row-major system `A x = b`
    pub fn solve(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        validate_system(a, b, n)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        let factory = SparseSolverFactory;
        let backend = self.config.solver.as_str();
        if !factory.query(backend) {
            log::warn!(
                "sparse backend '{}' is not available (have {:?})",
                backend,
                SparseSolverFactory::AVAILABLE
            );
        }

        let matrix = CsrMatrix::from_dense_slice(a, n)?;
        let mut solver = factory
            .create(backend, &matrix, self.ctx, self.config.pivot_tolerance)
            .ok_or_else(|| LinsolveError::BackendUnavailable {
                strategy: StrategyId::DirectSparse,
                backend: backend.to_string(),
            })?;

        solver.symbolic_factorization().map_err(into_error)?;
        solver.numeric_factorization().map_err(into_error)?;
        let x = solver.solve(b).map_err(into_error)?;
        log::debug!("sparse backend {} solved n = {}", solver.name(), n);
        Ok(x)
    }
}

fn into_error(status: SparseStatus) -> LinsolveError {
    match status {
        SparseStatus::NumericallySingular { step, value } => {
            LinsolveError::SingularMatrix { pivot: step, value }
        }
        other => LinsolveError::SolveFailed {
            strategy: StrategyId::DirectSparse,
            reason: other.to_string(),
        },
    }
}
