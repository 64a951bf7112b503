//! Backend strategies
//!
//! A [`Strategy`] solves a row-major `n × n` system with one backend. Every
//! variant exposes the same [`Strategy::solve`]; the adapters own the
//! conversion from the caller's layout to their engine's and never write to
//! caller buffers.

mod dense;
mod krylov;
mod sparse;

pub use dense::DenseAdapter;
pub use krylov::KrylovAdapter;
pub use sparse::SparseAdapter;

use crate::direct::solve_reference;
use crate::error::{Result, ensure_len, ensure_square_len};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a backend strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyId {
    /// Reference LU, used below the size threshold
    DirectSmall,
    /// Dense engine, used at or above the size threshold
    DirectLargeDense,
    /// Sparse direct engine
    DirectSparse,
    /// Restarted GMRES
    IterativeKrylov,
}

impl StrategyId {
    /// Every strategy, in declaration order
    pub const ALL: [StrategyId; 4] = [
        StrategyId::DirectSmall,
        StrategyId::DirectLargeDense,
        StrategyId::DirectSparse,
        StrategyId::IterativeKrylov,
    ];

    /// Kebab-case name, as used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            StrategyId::DirectSmall => "direct-small",
            StrategyId::DirectLargeDense => "direct-large-dense",
            StrategyId::DirectSparse => "direct-sparse",
            StrategyId::IterativeKrylov => "iterative-krylov",
        }
    }

    /// True for strategies the size-based selection can pick on its own
    pub fn is_automatic(self) -> bool {
        matches!(self, StrategyId::DirectSmall | StrategyId::DirectLargeDense)
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ready-to-run backend
#[derive(Debug)]
pub enum Strategy<'ctx> {
    /// Reference LU
    DirectSmall,
    /// Column-major dense engine
    DirectLargeDense(DenseAdapter<'ctx>),
    /// Sparse direct engine
    DirectSparse(SparseAdapter<'ctx>),
    /// Preconditioned GMRES
    IterativeKrylov(KrylovAdapter<'ctx>),
}

impl Strategy<'_> {
    /// Identifier of this strategy
    pub fn id(&self) -> StrategyId {
        match self {
            Strategy::DirectSmall => StrategyId::DirectSmall,
            Strategy::DirectLargeDense(_) => StrategyId::DirectLargeDense,
            Strategy::DirectSparse(_) => StrategyId::DirectSparse,
            Strategy::IterativeKrylov(_) => StrategyId::IterativeKrylov,
        }
    }

    /// Solve the row-major system `A x = b`
    pub fn solve(&self, a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
        match self {
            Strategy::DirectSmall => solve_reference(a, b, n),
            Strategy::DirectLargeDense(adapter) => adapter.solve(a, b, n),
            Strategy::DirectSparse(adapter) => adapter.solve(a, b, n),
            Strategy::IterativeKrylov(adapter) => adapter.solve(a, b, n),
        }
    }
}

/// Check `A` has `n²` and `b` has `n` entries
pub(crate) fn validate_system(a: &[f64], b: &[f64], n: usize) -> Result<()> {
    ensure_square_len("A", n, a.len())?;
    ensure_len("b", n, b.len())
}
