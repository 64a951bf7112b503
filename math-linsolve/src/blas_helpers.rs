//! Level-1 vector kernels used by the Krylov engine
//!
//! GMRES only needs inner products, norms and axpy updates on the Arnoldi
//! basis, so these are plain folds over `ndarray` vectors.

use crate::traits::RealField;
use ndarray::{Array1, Zip};

/// `Σ x_i y_i`; both vectors come from the same Krylov basis
#[inline]
pub fn inner_product<T: RealField>(x: &Array1<T>, y: &Array1<T>) -> T {
    debug_assert_eq!(x.len(), y.len(), "basis vectors differ in length");
    x.iter()
        .zip(y.iter())
        .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
}

/// Euclidean norm
#[inline]
pub fn vector_norm<T: RealField>(x: &Array1<T>) -> T {
    vector_norm_sqr(x).sqrt()
}

/// Squared Euclidean norm, without the square root
#[inline]
pub fn vector_norm_sqr<T: RealField>(x: &Array1<T>) -> T {
    x.fold(T::zero(), |acc, &xi| acc + xi * xi)
}

/// `y += alpha * x`
#[inline]
pub fn axpy<T: RealField>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    Zip::from(y).and(x).for_each(|yi, &xi| *yi += alpha * xi);
}

/// `x *= alpha`
#[inline]
pub fn scale_inplace<T: RealField>(x: &mut Array1<T>, alpha: T) {
    x.mapv_inplace(|xi| xi * alpha);
}
