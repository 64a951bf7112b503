//! Preconditioners for iterative solvers
//!
//! Preconditioners approximate A^(-1) to accelerate convergence of iterative methods.
//!
//! - **DiagonalPreconditioner** (Jacobi): diagonal scaling
//! - **IdentityPreconditioner**: no preconditioning

mod diagonal;

pub use diagonal::DiagonalPreconditioner;

// Re-export IdentityPreconditioner from traits
pub use crate::traits::IdentityPreconditioner;
