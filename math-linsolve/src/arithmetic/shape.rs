//! Shape-tagged multiplication
//!
//! [`multiply_shaped`] takes operands whose shape is stated by the caller.
//! [`multiply`] is the older entry point that guesses the shape from the
//! buffer length; at `n = 1` a vector and a matrix have the same length and
//! the guess resolves to the vector case.

use super::matrix::{matmul_into, matvec_into};
use crate::error::{LinsolveError, Result, ensure_len};
use std::fmt;

/// Operand shape for a problem of size `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `n` values
    Vector,
    /// `n²` values, row-major
    Matrix,
}

impl Shape {
    /// Number of elements an operand of this shape holds for size `n`.
    ///
    /// Saturates at `usize::MAX`, which no buffer can match.
    pub fn len(self, n: usize) -> usize {
        match self {
            Shape::Vector => n,
            Shape::Matrix => n.saturating_mul(n),
        }
    }

    /// Infer a shape from a buffer length, preferring `Vector` when both fit.
    pub fn infer(what: &'static str, len: usize, n: usize) -> Result<Self> {
        if len == n {
            Ok(Shape::Vector)
        } else if n.checked_mul(n) == Some(len) {
            Ok(Shape::Matrix)
        } else {
            Err(LinsolveError::SizeMismatch {
                what,
                expected: Shape::Matrix.len(n),
                got: len,
            })
        }
    }

    /// Shape of `a * b`, or `None` when the product is not defined.
    pub fn product(a: Shape, b: Shape) -> Option<Shape> {
        match (a, b) {
            (Shape::Vector, Shape::Vector) => Some(Shape::Vector),
            (Shape::Matrix, Shape::Vector) => Some(Shape::Vector),
            (Shape::Matrix, Shape::Matrix) => Some(Shape::Matrix),
            (Shape::Vector, Shape::Matrix) => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Vector => write!(f, "vector"),
            Shape::Matrix => write!(f, "matrix"),
        }
    }
}

/// A borrowed buffer together with its declared shape.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    data: &'a [f64],
    shape: Shape,
}

impl<'a> Operand<'a> {
    /// Tag `data` as a vector.
    pub fn vector(data: &'a [f64]) -> Self {
        Self {
            data,
            shape: Shape::Vector,
        }
    }

    /// Tag `data` as a row-major square matrix.
    pub fn matrix(data: &'a [f64]) -> Self {
        Self {
            data,
            shape: Shape::Matrix,
        }
    }

    /// Tag `data` by guessing from its length.
    pub fn infer(what: &'static str, data: &'a [f64], n: usize) -> Result<Self> {
        let shape = Shape::infer(what, data.len(), n)?;
        Ok(Self { data, shape })
    }

    /// Declared shape
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Underlying buffer
    pub fn data(&self) -> &'a [f64] {
        self.data
    }

    fn check(&self, what: &'static str, n: usize) -> Result<()> {
        ensure_len(what, self.shape.len(n), self.data.len())
    }
}

/// Multiply two shape-tagged operands of size `n`.
///
/// - vector · vector: element-wise product
/// - matrix · vector: matrix-vector product
/// - matrix · matrix: matrix product, row-major output
/// - vector · matrix: [`LinsolveError::UnsupportedShape`]
pub fn multiply_shaped(a: Operand<'_>, b: Operand<'_>, n: usize) -> Result<Vec<f64>> {
    a.check("a", n)?;
    b.check("b", n)?;
    let out = result_shape(a, b)?;

    let mut x = vec![0.0; out.len(n)];
    multiply_unchecked(a, b, n, &mut x);
    Ok(x)
}

/// Multiply two buffers whose shapes are inferred from their lengths.
pub fn multiply(a: &[f64], b: &[f64], n: usize) -> Result<Vec<f64>> {
    let a = Operand::infer("a", a, n)?;
    let b = Operand::infer("b", b, n)?;
    multiply_shaped(a, b, n)
}

/// Multiply into a caller buffer; `x` must already have the result's length.
///
/// Nothing is written to `x` unless every check passes.
pub fn multiply_into(a: &[f64], b: &[f64], n: usize, x: &mut [f64]) -> Result<()> {
    let a = Operand::infer("a", a, n)?;
    let b = Operand::infer("b", b, n)?;
    let out = result_shape(a, b)?;
    ensure_len("x", out.len(n), x.len())?;

    multiply_unchecked(a, b, n, x);
    Ok(())
}

fn result_shape(a: Operand<'_>, b: Operand<'_>) -> Result<Shape> {
    Shape::product(a.shape, b.shape).ok_or(LinsolveError::UnsupportedShape {
        a: a.shape,
        b: b.shape,
    })
}

fn multiply_unchecked(a: Operand<'_>, b: Operand<'_>, n: usize, x: &mut [f64]) {
    match (a.shape, b.shape) {
        (Shape::Vector, Shape::Vector) => {
            for ((xi, ai), bi) in x.iter_mut().zip(a.data).zip(b.data) {
                *xi = ai * bi;
            }
        }
        (Shape::Matrix, Shape::Vector) => matvec_into(a.data, b.data, n, x),
        (Shape::Matrix, Shape::Matrix) => matmul_into(a.data, b.data, n, x),
        (Shape::Vector, Shape::Matrix) => unreachable!("rejected by result_shape"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(Shape::infer("a", 3, 3).unwrap(), Shape::Vector);
        assert_eq!(Shape::infer("a", 9, 3).unwrap(), Shape::Matrix);
        assert!(Shape::infer("a", 4, 3).is_err());
        // n = 1 is ambiguous and resolves to a vector
        assert_eq!(Shape::infer("a", 1, 1).unwrap(), Shape::Vector);
    }

    #[test]
    fn test_multiply_matrix_vector() {
        let x = multiply(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], 2).unwrap();
        assert_eq!(x, vec![17.0, 39.0]);
    }

    #[test]
    fn test_multiply_vector_vector() {
        let x = multiply(&[1.0, 2.0], &[5.0, 6.0], 2).unwrap();
        assert_eq!(x, vec![5.0, 12.0]);
    }

    #[test]
    fn test_multiply_matrix_matrix() {
        let x = multiply(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], 2).unwrap();
        assert_eq!(x, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_multiply_vector_matrix_unsupported() {
        let err = multiply(&[1.0, 2.0], &[1.0, 2.0, 3.0, 4.0], 2).unwrap_err();
        assert!(matches!(
            err,
            LinsolveError::UnsupportedShape {
                a: Shape::Vector,
                b: Shape::Matrix
            }
        ));
    }

    #[test]
    fn test_multiply_bad_length() {
        let err = multiply(&[1.0, 2.0, 3.0], &[1.0, 2.0], 2).unwrap_err();
        assert!(matches!(err, LinsolveError::SizeMismatch { what: "a", .. }));
    }

    #[test]
    fn test_multiply_shaped_explicit_at_n1() {
        // With explicit tags a 1×1 matrix times a 1-vector is a matvec
        let x = multiply_shaped(Operand::matrix(&[3.0]), Operand::vector(&[2.0]), 1).unwrap();
        assert_eq!(x, vec![6.0]);

        let err = multiply_shaped(Operand::vector(&[3.0]), Operand::matrix(&[2.0]), 1).unwrap_err();
        assert!(matches!(err, LinsolveError::UnsupportedShape { .. }));
    }

    #[test]
    fn test_multiply_shaped_checks_declared_length() {
        let err =
            multiply_shaped(Operand::matrix(&[1.0, 2.0]), Operand::vector(&[1.0, 2.0]), 2)
                .unwrap_err();
        assert!(matches!(
            err,
            LinsolveError::SizeMismatch {
                what: "a",
                expected: 4,
                got: 2
            }
        ));
    }

    #[test]
    fn test_multiply_into_checks_output_first() {
        let mut x = vec![-1.0; 3];
        let err = multiply_into(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], 2, &mut x).unwrap_err();
        assert!(matches!(err, LinsolveError::SizeMismatch { what: "x", .. }));
        assert_eq!(x, vec![-1.0; 3]);

        let mut x = vec![0.0; 2];
        multiply_into(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], 2, &mut x).unwrap();
        assert_eq!(x, vec![17.0, 39.0]);
    }

    #[test]
    fn test_operand_accessors() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let op = Operand::infer("a", &data, 2).unwrap();
        assert_eq!(op.shape(), Shape::Matrix);
        assert_eq!(op.data().len(), 4);
    }
}
