//! Direct-Large-Dense adapter

use super::{StrategyId, validate_system};
use crate::arithmetic::transpose;
use crate::config::Equilibration;
use crate::context::ExecutionContext;
use crate::engine::DenseEngine;
use crate::error::{LinsolveError, Result};

/// Solves through the column-major [`DenseEngine`]
#[derive(Debug, Clone)]
pub struct DenseAdapter<'ctx> {
    ctx: &'ctx ExecutionContext,
    equilibration: Equilibration,
}

impl<'ctx> DenseAdapter<'ctx> {
    /// Adapter running on `ctx` with the given scaling policy
    pub fn new(ctx: &'ctx ExecutionContext, equilibration: Equilibration) -> Self {
        Self { ctx, equilibration }
    }

    fn failed(reason: String) -> LinsolveError {
        LinsolveError::SolveFailed {
            strategy: StrategyId::DirectLargeDense,
            reason,
        }
    }

    /// Solve the row-major system `A x = b`
    pub fn solve(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        validate_system(a, b, n)?;
        if n == 0 {
            return Ok(Vec::new());
        }

        // Row-major A read as column-major is A^T; transposing gives the engine A
        let mut engine = DenseEngine::new(self.ctx, transpose(a, n)?, n);

        let equilibrate = match self.equilibration {
            Equilibration::Auto => engine.should_equilibrate(),
            Equilibration::Always => true,
            Equilibration::Never => false,
        };
        let info = if equilibrate {
            engine.factor_with_equilibration()
        } else {
            engine.factor()
        };
        if !info.is_ok() {
            return Err(Self::failed(format!("factorization failed: {info}")));
        }
        log::debug!("dense engine factored n = {} ({:?})", n, engine.equed());

        let mut x = b.to_vec();
        let info = engine.solve(&mut x);
        if !engine.solved() {
            return Err(Self::failed(format!("solve did not complete: {info}")));
        }
        engine.unequilibrate_lhs(&mut x);
        Ok(x)
    }
}
