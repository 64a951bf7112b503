//! Dense vector and matrix arithmetic over flat row-major buffers
//!
//! All functions are pure and check buffer lengths before touching any
//! output. A matrix of size `n` is a slice of `n²` values where element
//! `(i, j)` lives at index `j + n * i`.
//!
//! - [`dot`], [`cross`], [`elementwise`]: vector products
//! - [`matvec`], [`matmul`], [`transpose`]: matrix products and layout changes
//! - [`multiply`]: shape inferred from buffer lengths (compatibility entry point)
//! - [`multiply_shaped`]: shape given explicitly through [`Operand`]
//! - [`residual`], [`residual_norm`]: `b - A x` for solution checks

mod matrix;
mod shape;
mod vector;

pub use matrix::{matmul, matvec, residual, residual_norm, transpose};
pub use shape::{Operand, Shape, multiply, multiply_into, multiply_shaped};
pub use vector::{cross, cross_into, dot, dot_n, elementwise, norm};
