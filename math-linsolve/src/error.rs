//! Error types for linear-system solves and dense arithmetic.
//!
//! Every public operation returns [`Result`]. Precondition failures
//! (`SizeMismatch`, `UnsupportedShape`) are raised before any work is done;
//! numerical failures abort the call without touching caller buffers.

use crate::arithmetic::Shape;
use crate::strategy::StrategyId;
use thiserror::Error;

/// Errors that can occur while multiplying or solving.
#[derive(Debug, Error)]
pub enum LinsolveError {
    /// A buffer length does not match `n` or `n²`.
    #[error("size mismatch for {what}: expected {expected} elements, got {got}")]
    SizeMismatch {
        /// Name of the offending buffer ("A", "b", "x", ...)
        what: &'static str,
        /// Length implied by the problem size
        expected: usize,
        /// Length actually supplied
        got: usize,
    },

    /// `multiply` was called on an operand combination with no defined product.
    #[error("unsupported operand shapes: {a} times {b}")]
    UnsupportedShape {
        /// Shape of the left operand
        a: Shape,
        /// Shape of the right operand
        b: Shape,
    },

    /// The reference solver hit a zero or negligible pivot.
    #[error("singular matrix: pivot {pivot} has magnitude {value:e}")]
    SingularMatrix {
        /// Elimination step at which the pivot vanished
        pivot: usize,
        /// Magnitude of the rejected pivot
        value: f64,
    },

    /// An engine ran to completion but reported failure.
    #[error("{strategy} solve failed: {reason}")]
    SolveFailed {
        /// Strategy whose engine failed
        strategy: StrategyId,
        /// Engine-provided explanation
        reason: String,
    },

    /// The requested engine implementation is not present in this build.
    #[error("{strategy} backend '{backend}' is not available")]
    BackendUnavailable {
        /// Strategy that asked for the backend
        strategy: StrategyId,
        /// Name of the missing backend
        backend: String,
    },

    /// The iterative strategy exhausted its budget above tolerance.
    ///
    /// The last iterate is handed back so the caller can decide whether
    /// the achieved residual is good enough.
    #[error("not converged after {iterations} iterations (relative residual {residual:e})")]
    NotConverged {
        /// Iterations performed
        iterations: usize,
        /// Relative residual `||b - Ax|| / ||b||` of the last iterate
        residual: f64,
        /// The last iterate
        iterate: Vec<f64>,
    },
}

/// A specialized `Result` type for solver operations.
pub type Result<T> = std::result::Result<T, LinsolveError>;

impl LinsolveError {
    /// Returns `true` for errors raised by argument checks before any work.
    pub fn is_precondition_error(&self) -> bool {
        matches!(
            self,
            LinsolveError::SizeMismatch { .. } | LinsolveError::UnsupportedShape { .. }
        )
    }

    /// Returns `true` for failures discovered while computing.
    pub fn is_numerical_error(&self) -> bool {
        matches!(
            self,
            LinsolveError::SingularMatrix { .. }
                | LinsolveError::SolveFailed { .. }
                | LinsolveError::NotConverged { .. }
        )
    }

    /// Returns `true` if the failure depends on how the crate was built.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, LinsolveError::BackendUnavailable { .. })
    }
}

/// Check that a buffer has exactly `expected` elements.
#[inline]
pub(crate) fn ensure_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(LinsolveError::SizeMismatch {
            what,
            expected,
            got,
        })
    }
}

/// Check that a buffer holds an n×n matrix and return `n²`.
///
/// An `n` whose square overflows `usize` is reported as a mismatch.
#[inline]
pub(crate) fn ensure_square_len(what: &'static str, n: usize, got: usize) -> Result<usize> {
    let expected = n.checked_mul(n).ok_or(LinsolveError::SizeMismatch {
        what,
        expected: usize::MAX,
        got,
    })?;
    ensure_len(what, expected, got)?;
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_len_overflow() {
        assert_eq!(ensure_square_len("A", 3, 9).unwrap(), 9);
        assert!(matches!(
            ensure_square_len("A", usize::MAX, 4),
            Err(LinsolveError::SizeMismatch {
                what: "A",
                expected: usize::MAX,
                got: 4
            })
        ));
        assert!(ensure_square_len("A", 1 << 33, 0).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = LinsolveError::SizeMismatch {
            what: "A",
            expected: 9,
            got: 8,
        };
        assert_eq!(
            err.to_string(),
            "size mismatch for A: expected 9 elements, got 8"
        );
    }

    #[test]
    fn test_shape_error_display() {
        let err = LinsolveError::UnsupportedShape {
            a: Shape::Vector,
            b: Shape::Matrix,
        };
        assert_eq!(
            err.to_string(),
            "unsupported operand shapes: vector times matrix"
        );
    }

    #[test]
    fn test_backend_error_display() {
        let err = LinsolveError::BackendUnavailable {
            strategy: StrategyId::DirectSparse,
            backend: "Mumps".to_string(),
        };
        assert!(err.to_string().contains("direct-sparse"));
        assert!(err.to_string().contains("Mumps"));
        assert!(err.is_backend_error());
    }

    #[test]
    fn test_classification() {
        let size = LinsolveError::SizeMismatch {
            what: "b",
            expected: 3,
            got: 2,
        };
        let singular = LinsolveError::SingularMatrix {
            pivot: 1,
            value: 0.0,
        };
        let stalled = LinsolveError::NotConverged {
            iterations: 10,
            residual: 1e-2,
            iterate: vec![0.0; 3],
        };

        assert!(size.is_precondition_error());
        assert!(!size.is_numerical_error());
        assert!(singular.is_numerical_error());
        assert!(stalled.is_numerical_error());
        assert!(!stalled.is_precondition_error());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("x", 4, 4).is_ok());
        let err = ensure_len("x", 4, 5).unwrap_err();
        assert!(matches!(
            err,
            LinsolveError::SizeMismatch {
                what: "x",
                expected: 4,
                got: 5
            }
        ));
    }
}
