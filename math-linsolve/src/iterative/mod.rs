//! Iterative solvers for linear systems
//!
//! - [`gmres_preconditioned`]: GMRES(m) with restart and left
//!   preconditioning, for general non-symmetric systems

mod gmres;

pub use gmres::{GmresConfig, GmresSolution, gmres_preconditioned, gmres_preconditioned_with_guess};
