//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR format stores:
//! - `values`: stored entries in row-major order
//! - `col_indices`: Column index for each value
//! - `row_ptrs`: Index into values/col_indices where each row starts
//!
//! An entry that is stored is structurally present even when its value is
//! zero; the sparse factorization treats the pattern, not the values, as
//! the sparsity structure.

use crate::context::ExecutionContext;
use crate::error::{LinsolveError, Result, ensure_len, ensure_square_len};
use crate::parallel::parallel_map_indexed;
use crate::traits::{LinearOperator, RealField};
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Compressed Sparse Row (CSR) matrix format
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: RealField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Stored values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers: row_ptrs[i] is the start index in values/col_indices for row i
    /// row_ptrs[num_rows] = nnz (total number of stored entries)
    pub row_ptrs: Vec<usize>,
}

impl<T: RealField> CsrMatrix<T> {
    /// Create a CSR matrix from raw components
    ///
    /// The arrays must be consistent: `row_ptrs` has `num_rows + 1`
    /// non-decreasing entries ending at `values.len()`, `col_indices` has
    /// one entry per value and every column index is below `num_cols`.
    pub fn from_raw_parts(
        num_rows: usize,
        num_cols: usize,
        row_ptrs: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        ensure_len("row_ptrs", num_rows + 1, row_ptrs.len())?;
        ensure_len("col_indices", values.len(), col_indices.len())?;
        ensure_len("values", row_ptrs[num_rows], values.len())?;

        let monotone = row_ptrs.windows(2).all(|w| w[0] <= w[1]) && row_ptrs[0] == 0;
        if !monotone {
            return Err(LinsolveError::SizeMismatch {
                what: "row_ptrs",
                expected: values.len(),
                got: row_ptrs[num_rows],
            });
        }
        if let Some(&bad) = col_indices.iter().find(|&&j| j >= num_cols) {
            return Err(LinsolveError::SizeMismatch {
                what: "col_indices",
                expected: num_cols,
                got: bad + 1,
            });
        }

        Ok(Self {
            num_rows,
            num_cols,
            row_ptrs,
            col_indices,
            values,
        })
    }

    /// Store every entry of a row-major n×n buffer, zeros included
    pub fn from_dense_slice(a: &[T], n: usize) -> Result<Self> {
        ensure_square_len("A", n, a.len())?;

        let row_ptrs = (0..=n).map(|i| i * n).collect();
        let col_indices = (0..n).flat_map(|_| 0..n).collect();
        Self::from_raw_parts(n, n, row_ptrs, col_indices, a.to_vec())
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Get the range of indices in values/col_indices for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.row_ptrs[row]..self.row_ptrs[row + 1]
    }

    /// Get the (col, value) pairs for a row
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.row_range(row);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    fn row_dot(&self, row: usize, x: &[T]) -> T {
        self.row_entries(row)
            .fold(T::zero(), |sum, (j, v)| sum + v * x[j])
    }

    /// Matrix-vector product: y = A * x
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");
        Array1::from_iter((0..self.num_rows).map(|i| {
            self.row_entries(i)
                .fold(T::zero(), |sum, (j, v)| sum + v * x[j])
        }))
    }

    /// Matrix-vector product computed on the context's workers
    ///
    /// Rows are independent, so each worker produces a contiguous slice of
    /// `y`; a serial context falls back to [`matvec`](Self::matvec).
    pub fn matvec_in(&self, ctx: &ExecutionContext, x: &Array1<T>) -> Array1<T> {
        if !ctx.is_parallel() {
            return self.matvec(x);
        }
        assert_eq!(x.len(), self.num_cols, "Input vector size mismatch");
        let x = x.to_vec();
        let y = ctx.install(|| parallel_map_indexed(self.num_rows, |i| self.row_dot(i, &x)));
        Array1::from_vec(y)
    }

    /// Get element at (i, j), returns 0 if not stored
    pub fn get(&self, i: usize, j: usize) -> T {
        self.row_entries(i)
            .find(|&(col, _)| col == j)
            .map_or(T::zero(), |(_, v)| v)
    }

    /// Extract diagonal elements
    pub fn diagonal(&self) -> Array1<T> {
        let n = self.num_rows.min(self.num_cols);
        Array1::from_iter((0..n).map(|i| self.get(i, i)))
    }

    /// Create identity matrix in CSR format
    pub fn identity(n: usize) -> Self {
        Self {
            num_rows: n,
            num_cols: n,
            values: vec![T::one(); n],
            col_indices: (0..n).collect(),
            row_ptrs: (0..=n).collect(),
        }
    }

    /// Convert to dense matrix
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());

        for i in 0..self.num_rows {
            for (j, v) in self.row_entries(i) {
                dense[[i, j]] += v;
            }
        }

        dense
    }
}

impl<T: RealField> LinearOperator<T> for CsrMatrix<T> {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.matvec(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sparse_3x3() -> CsrMatrix<f64> {
        // [1 0 2]
        // [0 3 0]
        // [4 0 5]
        CsrMatrix::from_raw_parts(
            3,
            3,
            vec![0, 2, 3, 5],
            vec![0, 2, 1, 0, 2],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn test_csr_accessors() {
        let csr = sparse_3x3();

        assert_eq!(csr.num_rows, 3);
        assert_eq!(csr.num_cols, 3);
        assert_eq!(csr.nnz(), 5);
        assert_eq!(csr.row_range(2), 3..5);

        assert_relative_eq!(csr.get(0, 0), 1.0);
        assert_relative_eq!(csr.get(0, 2), 2.0);
        assert_relative_eq!(csr.get(1, 1), 3.0);
        assert_relative_eq!(csr.get(2, 0), 4.0);
        assert_relative_eq!(csr.get(2, 2), 5.0);
        assert_relative_eq!(csr.get(1, 0), 0.0);
        assert_eq!(csr.diagonal(), array![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_from_dense_slice_keeps_zeros() {
        let csr = CsrMatrix::from_dense_slice(&[1.0_f64, 0.0, 0.0, 2.0], 2).unwrap();
        assert_eq!(csr.nnz(), 4);
        assert_eq!(csr.row_ptrs, vec![0, 2, 4]);
        assert_eq!(csr.col_indices, vec![0, 1, 0, 1]);
        assert_eq!(csr.diagonal(), array![1.0, 2.0]);
    }

    #[test]
    fn test_from_dense_slice_size_checked() {
        assert!(CsrMatrix::from_dense_slice(&[1.0_f64, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn test_from_raw_parts_validates() {
        let ok = CsrMatrix::from_raw_parts(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0_f64, 2.0]);
        assert!(ok.is_ok());

        let bad_ptrs = CsrMatrix::from_raw_parts(2, 2, vec![0, 2], vec![0, 1], vec![1.0_f64, 2.0]);
        assert!(bad_ptrs.is_err());

        let bad_col = CsrMatrix::from_raw_parts(2, 2, vec![0, 1, 2], vec![0, 2], vec![1.0_f64, 2.0]);
        assert!(bad_col.is_err());

        let decreasing =
            CsrMatrix::from_raw_parts(2, 2, vec![0, 2, 1], vec![0, 1], vec![1.0_f64, 2.0]);
        assert!(decreasing.is_err());
    }

    #[test]
    fn test_csr_matvec() {
        let csr = CsrMatrix::from_dense_slice(&[1.0_f64, 2.0, 3.0, 4.0], 2).unwrap();
        let x = array![1.0_f64, 2.0];

        let y = csr.matvec(&x);

        // [1 2] * [1]   [5]
        // [3 4]   [2] = [11]
        assert_relative_eq!(y[0], 5.0, epsilon = 1e-10);
        assert_relative_eq!(y[1], 11.0, epsilon = 1e-10);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_matvec_in_thread_context() {
        let ctx = ExecutionContext::threads(2).unwrap();
        let n = 40;
        let a: Vec<f64> = (0..n * n).map(|k| ((k * 7) % 11) as f64 - 5.0).collect();
        let csr = CsrMatrix::from_dense_slice(&a, n).unwrap();
        let x = Array1::from_iter((0..n).map(|i| i as f64 * 0.25));

        let serial = csr.matvec(&x);
        let threaded = csr.matvec_in(&ctx, &x);
        for i in 0..n {
            assert_relative_eq!(serial[i], threaded[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_csr_identity() {
        let id: CsrMatrix<f64> = CsrMatrix::identity(3);

        assert_eq!(id.nnz(), 3);
        assert_relative_eq!(id.get(0, 0), 1.0);
        assert_relative_eq!(id.get(2, 2), 1.0);
        assert_relative_eq!(id.get(0, 1), 0.0);
    }

    #[test]
    fn test_csr_to_dense() {
        let dense = sparse_3x3().to_dense();
        assert_eq!(
            dense,
            array![[1.0, 0.0, 2.0], [0.0, 3.0, 0.0], [4.0, 0.0, 5.0]]
        );
    }

    #[test]
    fn test_linear_operator_impl() {
        let csr = CsrMatrix::from_dense_slice(&[1.0_f32, 2.0, 3.0, 4.0], 2).unwrap();
        let y = csr.apply(&array![1.0_f32, 2.0]);
        assert_relative_eq!(y[0], 5.0, epsilon = 1e-6);
        assert_relative_eq!(y[1], 11.0, epsilon = 1e-6);

        assert!(csr.is_square());
        assert_eq!(LinearOperator::num_rows(&csr), 2);
    }
}
