//! Sparse direct factorization engine
//!
//! Solvers are created by name through [`SparseSolverFactory`] and driven
//! through three phases: symbolic factorization (structure only), numeric
//! factorization and solve. Each phase must follow the previous one.
//!
//! - `"Klu"`: native sparse LU on sorted row lists with threshold partial
//!   pivoting. Rows below the pivot are eliminated on the execution
//!   context's workers.
//! - `"Lapack"`: densifies the matrix and uses the reference LU.

use crate::context::ExecutionContext;
use crate::direct::{LuFactorization, lu_factorize};
use crate::error::LinsolveError;
use crate::parallel::parallel_for_each_mut;
use crate::sparse::CsrMatrix;
use ndarray::Array1;
use thiserror::Error;

/// Active rows below which elimination stays on the calling thread
const PARALLEL_MIN_ROWS: usize = 32;

/// Failure of one of the sparse phases
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SparseStatus {
    /// The matrix is not square
    #[error("matrix is {rows}x{cols}, expected square")]
    NotSquare {
        /// Rows
        rows: usize,
        /// Columns
        cols: usize,
    },

    /// No row can supply a pivot for this column, whatever the values
    #[error("structurally singular: no entry available for column {column}")]
    StructurallySingular {
        /// Column without a structural pivot
        column: usize,
    },

    /// Every candidate pivot of this step is (numerically) zero
    #[error("numerically singular at step {step} (largest candidate {value:e})")]
    NumericallySingular {
        /// Elimination step
        step: usize,
        /// Largest candidate magnitude
        value: f64,
    },

    /// A phase was called before the one it depends on
    #[error("{phase} requires {required} first")]
    OutOfOrder {
        /// Phase that was called
        phase: &'static str,
        /// Phase that must run before it
        required: &'static str,
    },

    /// Right-hand side length does not match the matrix
    #[error("right-hand side has {got} entries, expected {expected}")]
    RhsLength {
        /// Matrix dimension
        expected: usize,
        /// Supplied length
        got: usize,
    },
}

/// A sparse direct solver bound to one matrix
pub trait SparseDirectSolver {
    /// Backend name as accepted by the factory
    fn name(&self) -> &'static str;

    /// Analyse the sparsity structure
    fn symbolic_factorization(&mut self) -> Result<(), SparseStatus>;

    /// Compute the numeric factors
    fn numeric_factorization(&mut self) -> Result<(), SparseStatus>;

    /// Solve with the computed factors
    fn solve(&self, b: &[f64]) -> Result<Vec<f64>, SparseStatus>;
}

/// Creates sparse solvers by backend name
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseSolverFactory;

impl SparseSolverFactory {
    /// Backend names this build can create
    pub const AVAILABLE: [&'static str; 2] = ["Klu", "Lapack"];

    /// True if `name` names an available backend
    pub fn query(&self, name: &str) -> bool {
        Self::AVAILABLE.contains(&name)
    }

    /// Create the named solver for `matrix`, or `None` if it is unknown
    pub fn create<'a>(
        &self,
        name: &str,
        matrix: &'a CsrMatrix<f64>,
        ctx: &'a ExecutionContext,
        pivot_tolerance: f64,
    ) -> Option<Box<dyn SparseDirectSolver + 'a>> {
        match name {
            "Klu" => Some(Box::new(KluSolver::new(matrix, ctx, pivot_tolerance))),
            "Lapack" => Some(Box::new(LapackSolver::new(matrix))),
            _ => None,
        }
    }
}

fn check_square(matrix: &CsrMatrix<f64>) -> Result<usize, SparseStatus> {
    if matrix.num_rows != matrix.num_cols {
        return Err(SparseStatus::NotSquare {
            rows: matrix.num_rows,
            cols: matrix.num_cols,
        });
    }
    Ok(matrix.num_rows)
}

/// Result of the symbolic phase
#[derive(Debug, Clone)]
struct Symbolic {
    /// Stored entries per column
    col_counts: Vec<usize>,
}

/// Row of the active submatrix during elimination
#[derive(Debug, Clone)]
struct WorkRow {
    /// Row index in the original matrix
    orig: usize,
    /// Remaining entries, sorted by column
    entries: Vec<(usize, f64)>,
    /// Multipliers recorded so far, keyed by elimination step
    lower: Vec<(usize, f64)>,
}

impl WorkRow {
    fn leading(&self, column: usize) -> Option<f64> {
        self.entries
            .first()
            .filter(|&&(j, _)| j == column)
            .map(|&(_, v)| v)
    }

    /// `row -= l * pivot_row` on the columns after `step`
    fn eliminate(&mut self, step: usize, pivot: f64, pivot_tail: &[(usize, f64)]) {
        let Some(lead) = self.leading(step) else {
            return;
        };
        let l = lead / pivot;
        self.lower.push((step, l));

        let tail = &self.entries[1..];
        let mut merged = Vec::with_capacity(tail.len() + pivot_tail.len());
        let (mut p, mut q) = (0, 0);
        while p < tail.len() || q < pivot_tail.len() {
            match (tail.get(p), pivot_tail.get(q)) {
                (Some(&(jr, vr)), Some(&(jp, vp))) if jr == jp => {
                    merged.push((jr, vr - l * vp));
                    p += 1;
                    q += 1;
                }
                (Some(&(jr, vr)), Some(&(jp, _))) if jr < jp => {
                    merged.push((jr, vr));
                    p += 1;
                }
                (Some(&(jr, vr)), None) => {
                    merged.push((jr, vr));
                    p += 1;
                }
                (_, Some(&(jp, vp))) => {
                    // Fill-in
                    merged.push((jp, -l * vp));
                    q += 1;
                }
                (None, None) => break,
            }
        }
        self.entries = merged;
    }
}

/// Factors `P A = L U`
#[derive(Debug, Clone)]
struct Numeric {
    /// `perm[k]` is the original row chosen as pivot at step `k`
    perm: Vec<usize>,
    /// Strict lower part, row `k` holds `(step, multiplier)` pairs
    lower: Vec<Vec<(usize, f64)>>,
    /// Upper part, row `k` starts with its diagonal entry
    upper: Vec<Vec<(usize, f64)>>,
}

/// Native sparse LU with threshold partial pivoting
///
/// At step `k` a candidate row is acceptable if its leading magnitude is at
/// least `pivot_tolerance` times the largest candidate; the original
/// diagonal row is kept whenever it is acceptable.
pub struct KluSolver<'a> {
    matrix: &'a CsrMatrix<f64>,
    ctx: &'a ExecutionContext,
    pivot_tolerance: f64,
    symbolic: Option<Symbolic>,
    numeric: Option<Numeric>,
}

impl<'a> KluSolver<'a> {
    /// Bind a solver to `matrix`
    pub fn new(
        matrix: &'a CsrMatrix<f64>,
        ctx: &'a ExecutionContext,
        pivot_tolerance: f64,
    ) -> Self {
        Self {
            matrix,
            ctx,
            pivot_tolerance,
            symbolic: None,
            numeric: None,
        }
    }

    /// Stored entries per column, once the symbolic phase has run
    pub fn column_counts(&self) -> Option<&[usize]> {
        self.symbolic.as_ref().map(|s| s.col_counts.as_slice())
    }

    fn choose_pivot(
        &self,
        active: &[WorkRow],
        step: usize,
        scale: f64,
    ) -> Result<usize, SparseStatus> {
        let mut best: Option<(usize, f64)> = None;
        let mut diagonal: Option<(usize, f64)> = None;
        for (idx, row) in active.iter().enumerate() {
            if let Some(v) = row.leading(step) {
                let mag = v.abs();
                if best.is_none_or(|(_, m)| mag > m) {
                    best = Some((idx, mag));
                }
                if row.orig == step {
                    diagonal = Some((idx, mag));
                }
            }
        }

        let Some((best_idx, best_mag)) = best else {
            return Err(SparseStatus::StructurallySingular { column: step });
        };
        if best_mag <= scale * f64::EPSILON || !best_mag.is_finite() {
            return Err(SparseStatus::NumericallySingular {
                step,
                value: best_mag,
            });
        }

        match diagonal {
            Some((idx, mag)) if mag >= self.pivot_tolerance * best_mag => Ok(idx),
            _ => Ok(best_idx),
        }
    }
}

impl SparseDirectSolver for KluSolver<'_> {
    fn name(&self) -> &'static str {
        "Klu"
    }

    fn symbolic_factorization(&mut self) -> Result<(), SparseStatus> {
        let n = check_square(self.matrix)?;

        let mut col_counts = vec![0usize; n];
        for i in 0..n {
            if self.matrix.row_range(i).is_empty() {
                return Err(SparseStatus::StructurallySingular { column: i });
            }
            for (j, _) in self.matrix.row_entries(i) {
                col_counts[j] += 1;
            }
        }
        if let Some(column) = col_counts.iter().position(|&c| c == 0) {
            return Err(SparseStatus::StructurallySingular { column });
        }

        log::debug!(
            "Klu symbolic: n = {}, nnz = {}",
            n,
            self.matrix.nnz()
        );
        self.symbolic = Some(Symbolic { col_counts });
        self.numeric = None;
        Ok(())
    }

    fn numeric_factorization(&mut self) -> Result<(), SparseStatus> {
        if self.symbolic.is_none() {
            return Err(SparseStatus::OutOfOrder {
                phase: "numeric factorization",
                required: "symbolic factorization",
            });
        }
        let n = self.matrix.num_rows;

        let mut active: Vec<WorkRow> = (0..n)
            .map(|i| {
                let mut entries: Vec<(usize, f64)> = self.matrix.row_entries(i).collect();
                entries.sort_by_key(|&(j, _)| j);
                WorkRow {
                    orig: i,
                    entries,
                    lower: Vec::new(),
                }
            })
            .collect();

        let mut perm = Vec::with_capacity(n);
        let mut lower = Vec::with_capacity(n);
        let mut upper = Vec::with_capacity(n);
        let ctx = self.ctx;
        let scale = self
            .matrix
            .values
            .iter()
            .fold(0.0_f64, |m, v| m.max(v.abs()));

        for step in 0..n {
            let idx = self.choose_pivot(&active, step, scale)?;
            let pivot_row = active.swap_remove(idx);
            let pivot = pivot_row.entries[0].1;
            let tail = &pivot_row.entries[1..];

            let eliminate = |row: &mut WorkRow| row.eliminate(step, pivot, tail);
            if ctx.is_parallel() && active.len() >= PARALLEL_MIN_ROWS {
                ctx.install(|| parallel_for_each_mut(&mut active, eliminate));
            } else {
                active.iter_mut().for_each(eliminate);
            }

            perm.push(pivot_row.orig);
            lower.push(pivot_row.lower);
            upper.push(pivot_row.entries);
        }

        log::debug!(
            "Klu numeric: n = {}, nnz(L) = {}, nnz(U) = {}",
            n,
            lower.iter().map(Vec::len).sum::<usize>(),
            upper.iter().map(Vec::len).sum::<usize>()
        );
        self.numeric = Some(Numeric { perm, lower, upper });
        Ok(())
    }

    fn solve(&self, b: &[f64]) -> Result<Vec<f64>, SparseStatus> {
        let Some(numeric) = &self.numeric else {
            return Err(SparseStatus::OutOfOrder {
                phase: "solve",
                required: "numeric factorization",
            });
        };
        let n = numeric.perm.len();
        if b.len() != n {
            return Err(SparseStatus::RhsLength {
                expected: n,
                got: b.len(),
            });
        }

        // L y = P b
        let mut y: Vec<f64> = numeric.perm.iter().map(|&i| b[i]).collect();
        for k in 0..n {
            let sum: f64 = numeric.lower[k].iter().map(|&(j, l)| l * y[j]).sum();
            y[k] -= sum;
        }

        // U x = y
        let mut x = vec![0.0; n];
        for k in (0..n).rev() {
            let row = &numeric.upper[k];
            let sum: f64 = row[1..].iter().map(|&(j, u)| u * x[j]).sum();
            x[k] = (y[k] - sum) / row[0].1;
        }
        Ok(x)
    }
}

/// Densifying backend over the reference LU
pub struct LapackSolver<'a> {
    matrix: &'a CsrMatrix<f64>,
    analysed: bool,
    factors: Option<LuFactorization<f64>>,
}

impl<'a> LapackSolver<'a> {
    /// Bind a solver to `matrix`
    pub fn new(matrix: &'a CsrMatrix<f64>) -> Self {
        Self {
            matrix,
            analysed: false,
            factors: None,
        }
    }
}

impl SparseDirectSolver for LapackSolver<'_> {
    fn name(&self) -> &'static str {
        "Lapack"
    }

    fn symbolic_factorization(&mut self) -> Result<(), SparseStatus> {
        check_square(self.matrix)?;
        self.analysed = true;
        self.factors = None;
        Ok(())
    }

    fn numeric_factorization(&mut self) -> Result<(), SparseStatus> {
        if !self.analysed {
            return Err(SparseStatus::OutOfOrder {
                phase: "numeric factorization",
                required: "symbolic factorization",
            });
        }
        match lu_factorize(&self.matrix.to_dense()) {
            Ok(lu) => {
                self.factors = Some(lu);
                Ok(())
            }
            Err(LinsolveError::SingularMatrix { pivot, value }) => {
                Err(SparseStatus::NumericallySingular { step: pivot, value })
            }
            Err(_) => Err(SparseStatus::NotSquare {
                rows: self.matrix.num_rows,
                cols: self.matrix.num_cols,
            }),
        }
    }

    fn solve(&self, b: &[f64]) -> Result<Vec<f64>, SparseStatus> {
        let Some(lu) = &self.factors else {
            return Err(SparseStatus::OutOfOrder {
                phase: "solve",
                required: "numeric factorization",
            });
        };
        lu.solve(&Array1::from_vec(b.to_vec()))
            .map(|x| x.to_vec())
            .map_err(|_| SparseStatus::RhsLength {
                expected: lu.n,
                got: b.len(),
            })
    }
}
