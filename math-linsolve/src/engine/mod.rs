//! Factorization engines behind the large-system strategies
//!
//! - [`dense`]: column-major LU with LAPACK-style status codes and
//!   optional equilibration
//! - [`sparse`]: name-selected sparse direct solvers over CSR input
//!
//! Engines speak their own status types; the strategy adapters translate
//! them into [`LinsolveError`](crate::LinsolveError).

pub mod dense;
pub mod sparse;

pub use dense::{DenseEngine, Equed, Info};
pub use sparse::{
    KluSolver, LapackSolver, SparseDirectSolver, SparseSolverFactory, SparseStatus,
};
