//! Matrix products on row-major buffers

use super::vector::norm;
use crate::error::{Result, ensure_len, ensure_square_len};

/// Matrix-vector product `x = A b` for an n×n row-major `a`.
///
/// `x[i] = Σ_k a[k + n*i] * b[k]`
pub fn matvec(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    ensure_square_len("A", n, a.len())?;
    ensure_len("b", n, b.len())?;

    let mut x = vec![0.0; n];
    matvec_into(a, b, n, &mut x);
    Ok(x)
}

/// Unchecked matrix-vector product; lengths are validated by the caller.
pub(crate) fn matvec_into(a: &[f64], b: &[f64], n: usize, x: &mut [f64]) {
    if n == 0 {
        return;
    }
    for (row, xi) in a.chunks_exact(n).zip(x.iter_mut()) {
        *xi = row.iter().zip(b).fold(0.0, |sum, (aik, bk)| sum + aik * bk);
    }
}

/// Matrix product `X = A B` of two n×n row-major matrices.
///
/// The result uses the same row-major convention as the inputs:
/// `x[j + n*i] = Σ_k a[k + n*i] * b[j + n*k]`.
pub fn matmul(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    let len = ensure_square_len("A", n, a.len())?;
    ensure_len("B", len, b.len())?;

    let mut x = vec![0.0; len];
    matmul_into(a, b, n, &mut x);
    Ok(x)
}

/// Unchecked matrix product; lengths are validated by the caller.
pub(crate) fn matmul_into(a: &[f64], b: &[f64], n: usize, x: &mut [f64]) {
    if n == 0 {
        return;
    }
    x.fill(0.0);
    // i-k-j order: each x[i][j] still receives its terms in increasing k
    for (a_row, x_row) in a.chunks_exact(n).zip(x.chunks_exact_mut(n)) {
        for (&aik, b_row) in a_row.iter().zip(b.chunks_exact(n)) {
            for (xij, bkj) in x_row.iter_mut().zip(b_row) {
                *xij += aik * bkj;
            }
        }
    }
}

/// Transpose an n×n matrix.
///
/// Also converts between row-major and column-major storage of the same
/// logical matrix.
pub fn transpose(a: &[f64], n: usize) -> Result<Vec<f64>> {
    let len = ensure_square_len("A", n, a.len())?;

    let mut t = vec![0.0; len];
    for i in 0..n {
        for j in 0..n {
            t[i + n * j] = a[j + n * i];
        }
    }
    Ok(t)
}

/// Residual vector `r = b - A x`.
pub fn residual(a: &[f64], x: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    ensure_square_len("A", n, a.len())?;
    ensure_len("x", n, x.len())?;
    ensure_len("b", n, b.len())?;

    let mut r = vec![0.0; n];
    matvec_into(a, x, n, &mut r);
    for (ri, bi) in r.iter_mut().zip(b) {
        *ri = bi - *ri;
    }
    Ok(r)
}

/// Euclidean norm of `b - A x`.
pub fn residual_norm(a: &[f64], x: &[f64], b: &[f64], n: usize) -> Result<f64> {
    residual(a, x, b, n).map(|r| norm(&r))
}
