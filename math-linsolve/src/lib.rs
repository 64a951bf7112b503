//! Size-adaptive dense linear-system solver
//!
//! Solves `A x = b` for a square, row-major `f64` matrix and picks a backend
//! by problem size: a pure-Rust LU below the threshold (300 by default), a
//! column-major dense engine with optional equilibration at or above it.
//! A sparse direct engine and restarted GMRES are available on request, and
//! every backend sits behind the same [`Strategy::solve`].
//!
//! # Features
//!
//! - **Dense arithmetic**: dot, cross, matrix-vector and matrix-matrix
//!   products on flat buffers
//! - **Direct solvers**: LU with partial pivoting, dense engine with
//!   LAPACK-style status codes, sparse LU with threshold pivoting
//! - **Iterative solver**: GMRES(m) with Jacobi preconditioning
//! - **Configuration**: JSON or TOML, including a thread-pool execution
//!   context for the large-system strategies
//!
//! # Example
//!
//! ```
//! use math_linsolve::{StrategyId, solve, solve_with};
//!
//! // 4 x0 + 3 x1 = 1
//! // 6 x0 + 3 x1 = 2
//! let a = [4.0, 3.0, 6.0, 3.0];
//! let b = [1.0, 2.0];
//!
//! let x = solve(&a, &b, 2)?;
//! assert!((x[0] - 0.5).abs() < 1e-12);
//!
//! let y = solve_with(StrategyId::DirectSparse, &a, &b, 2)?;
//! assert!((x[1] - y[1]).abs() < 1e-12);
//! # Ok::<(), math_linsolve::LinsolveError>(())
//! ```

pub mod arithmetic;
pub mod blas_helpers;
pub mod config;
pub mod context;
pub mod direct;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod iterative;
pub mod parallel;
pub mod preconditioners;
pub mod sparse;
pub mod strategy;
pub mod traits;

// Re-export main types
pub use config::{ConfigError, ConfigFormat, LinsolveConfig, load_config, parse_config, save_config};
pub use context::ExecutionContext;
pub use dispatch::{DEFAULT_SIZE_THRESHOLD, SelectionPolicy, Solver, solve, solve_with};
pub use error::{LinsolveError, Result};
pub use strategy::{Strategy, StrategyId};

// Re-export arithmetic
pub use arithmetic::{Operand, Shape, cross, dot, multiply, multiply_into, norm};

// Re-export building blocks
pub use direct::{LuFactorization, lu_solve, solve_reference};
pub use iterative::{GmresConfig, GmresSolution, gmres_preconditioned};
pub use preconditioners::{DiagonalPreconditioner, IdentityPreconditioner};
pub use sparse::CsrMatrix;
pub use traits::{LinearOperator, Preconditioner, RealField};
