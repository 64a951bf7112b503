//! Sparse matrix structures (CSR format)
//!
//! The sparse direct strategy hands its system to the engine in this
//! format, and the Krylov strategy uses it as its linear operator.

mod csr;

pub use csr::CsrMatrix;
