//! Vector products

use crate::error::{Result, ensure_len};

/// Dot product Σ a_i * b_i, accumulated left to right.
///
/// The fixed accumulation order makes results bit-for-bit reproducible.
pub fn dot(a: &[f64], b: &[f64]) -> Result<f64> {
    ensure_len("b", a.len(), b.len())?;
    Ok(a.iter().zip(b).fold(0.0, |sum, (ai, bi)| sum + ai * bi))
}

/// Dot product with an explicit problem size `n`.
pub fn dot_n(a: &[f64], b: &[f64], n: usize) -> Result<f64> {
    ensure_len("a", n, a.len())?;
    ensure_len("b", n, b.len())?;
    dot(a, b)
}

/// Euclidean norm of a vector.
pub fn norm(a: &[f64]) -> f64 {
    a.iter().fold(0.0, |sum, ai| sum + ai * ai).sqrt()
}

/// 3-D cross product a × b.
///
/// Both operands must have exactly three components.
pub fn cross(a: &[f64], b: &[f64]) -> Result<[f64; 3]> {
    ensure_len("a", 3, a.len())?;
    ensure_len("b", 3, b.len())?;

    Ok([
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ])
}

/// 3-D cross product written into `x`, which must have length 3.
pub fn cross_into(a: &[f64], b: &[f64], x: &mut [f64]) -> Result<()> {
    ensure_len("x", 3, x.len())?;
    let c = cross(a, b)?;
    x.copy_from_slice(&c);
    Ok(())
}

/// Element-wise (Hadamard) product of two vectors of equal length.
pub fn elementwise(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    ensure_len("b", a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(ai, bi)| ai * bi).collect())
}
