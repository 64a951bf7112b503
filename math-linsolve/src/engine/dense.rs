//! Column-major dense LU engine
//!
//! Works like the LAPACK driver routines: every phase returns an [`Info`]
//! status, `0` on success, `k > 0` when the pivot of column `k` (1-based)
//! vanished and `k < 0` when argument `-k` was invalid. Scaling follows
//! `xGEEQU`/`xLAQGE`: row factors `r`, column factors `c`, and the system
//! actually factored is `diag(r) A diag(c)`.
//!
//! The trailing-matrix update of each elimination step touches every column
//! right of the pivot independently and is spread over the execution
//! context's workers.

use crate::context::ExecutionContext;
use crate::parallel::parallel_chunks_mut;
use std::fmt;

/// Trailing columns below which the update stays on the calling thread
const PARALLEL_MIN_COLUMNS: usize = 64;

/// Scaling ratio below which equilibration is applied
const THRESH: f64 = 0.1;

/// LAPACK-style status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Info(i32);

impl Info {
    /// Success
    pub const OK: Info = Info(0);

    fn zero_pivot(column: usize) -> Self {
        Info(i32::try_from(column + 1).unwrap_or(i32::MAX))
    }

    fn bad_argument(position: i32) -> Self {
        Info(-position)
    }

    /// Raw status code
    pub fn code(self) -> i32 {
        self.0
    }

    /// True for a zero status
    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Zero-based column of the vanished pivot, if that is the failure
    pub fn singular_column(self) -> Option<usize> {
        usize::try_from(self.0).ok().filter(|&k| k > 0).map(|k| k - 1)
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "info = 0"),
            k if k > 0 => write!(f, "info = {k} (U({k},{k}) is exactly zero)"),
            k => write!(f, "info = {k} (argument {} had an illegal value)", -k),
        }
    }
}

/// Which side of the matrix the scaling was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equed {
    /// No scaling
    None,
    /// Rows only: `diag(r) A`
    Row,
    /// Columns only: `A diag(c)`
    Column,
    /// Both: `diag(r) A diag(c)`
    Both,
}

#[derive(Debug, Clone)]
struct Scaling {
    r: Vec<f64>,
    c: Vec<f64>,
    equed: Equed,
}

/// Dense LU engine over a column-major `n × n` matrix
pub struct DenseEngine<'ctx> {
    ctx: &'ctx ExecutionContext,
    n: usize,
    a: Vec<f64>,
    ipiv: Vec<usize>,
    scaling: Option<Scaling>,
    factored: bool,
    solved: bool,
    #[cfg(feature = "ndarray-linalg")]
    lapack: Option<ndarray_linalg::LUFactorized<ndarray::OwnedRepr<f64>>>,
}

impl<'ctx> DenseEngine<'ctx> {
    /// Take ownership of a column-major matrix buffer
    pub fn new(ctx: &'ctx ExecutionContext, a: Vec<f64>, n: usize) -> Self {
        Self {
            ctx,
            n,
            a,
            ipiv: Vec::new(),
            scaling: None,
            factored: false,
            solved: false,
            #[cfg(feature = "ndarray-linalg")]
            lapack: None,
        }
    }

    /// Matrix dimension
    pub fn n(&self) -> usize {
        self.n
    }

    /// Scaling applied by the last factorization
    pub fn equed(&self) -> Equed {
        self.scaling.as_ref().map_or(Equed::None, |s| s.equed)
    }

    /// True once [`solve`](Self::solve) finished on a factored matrix
    pub fn solved(&self) -> bool {
        self.solved
    }

    fn check_args(&self) -> Info {
        if self.a.len() != self.n * self.n {
            return Info::bad_argument(1);
        }
        Info::OK
    }

    /// Compute row and column scale factors and decide whether to use them
    ///
    /// Returns `false` when the matrix is already well scaled or when a row
    /// or column is entirely zero (the factorization will report that).
    pub fn should_equilibrate(&mut self) -> bool {
        if !self.check_args().is_ok() {
            return false;
        }
        match self.compute_scaling() {
            Some(scaling) => {
                let needed = scaling.equed != Equed::None;
                self.scaling = Some(scaling);
                needed
            }
            None => false,
        }
    }

    /// `xGEEQU` followed by the `xLAQGE` decision
    fn compute_scaling(&self) -> Option<Scaling> {
        let n = self.n;
        if n == 0 {
            return None;
        }
        let smlnum = f64::MIN_POSITIVE;
        let bignum = 1.0 / smlnum;

        let mut r = vec![0.0_f64; n];
        for j in 0..n {
            for (i, ri) in r.iter_mut().enumerate() {
                *ri = ri.max(self.a[i + j * n].abs());
            }
        }
        let amax = r.iter().copied().fold(0.0_f64, f64::max);
        let rcmin = r.iter().copied().fold(f64::INFINITY, f64::min);
        if rcmin == 0.0 {
            return None;
        }
        let rowcnd = rcmin.max(smlnum) / amax.min(bignum);
        for ri in r.iter_mut() {
            *ri = 1.0 / ri.clamp(smlnum, bignum);
        }

        let mut c = vec![0.0_f64; n];
        for (j, cj) in c.iter_mut().enumerate() {
            let column = &self.a[j * n..(j + 1) * n];
            *cj = column
                .iter()
                .zip(&r)
                .fold(0.0_f64, |m, (v, ri)| m.max(v.abs() * ri));
        }
        let ccmin = c.iter().copied().fold(f64::INFINITY, f64::min);
        let ccmax = c.iter().copied().fold(0.0_f64, f64::max);
        if ccmin == 0.0 {
            return None;
        }
        let colcnd = ccmin.max(smlnum) / ccmax.min(bignum);
        for cj in c.iter_mut() {
            *cj = 1.0 / cj.clamp(smlnum, bignum);
        }

        let small = smlnum / f64::EPSILON;
        let large = 1.0 / small;
        let rows_fine = rowcnd >= THRESH && amax >= small && amax <= large;
        let cols_fine = colcnd >= THRESH;
        let equed = match (rows_fine, cols_fine) {
            (true, true) => Equed::None,
            (true, false) => Equed::Column,
            (false, true) => Equed::Row,
            (false, false) => Equed::Both,
        };
        log::debug!(
            "equilibration: rowcnd = {:.3e}, colcnd = {:.3e}, amax = {:.3e} -> {:?}",
            rowcnd,
            colcnd,
            amax,
            equed
        );

        Some(Scaling { r, c, equed })
    }

    /// Scale the matrix, then factor it
    ///
    /// Uses the decision of a preceding [`should_equilibrate`] call. Without
    /// one, both row and column factors are computed and applied.
    ///
    /// [`should_equilibrate`]: Self::should_equilibrate
    pub fn factor_with_equilibration(&mut self) -> Info {
        let info = self.check_args();
        if !info.is_ok() {
            return info;
        }
        if self.scaling.is_none() {
            self.scaling = self.compute_scaling().map(|mut s| {
                s.equed = Equed::Both;
                s
            });
        }
        if let Some(scaling) = &self.scaling {
            let n = self.n;
            let use_rows = matches!(scaling.equed, Equed::Row | Equed::Both);
            let use_cols = matches!(scaling.equed, Equed::Column | Equed::Both);
            for j in 0..n {
                let cj = if use_cols { scaling.c[j] } else { 1.0 };
                for i in 0..n {
                    let ri = if use_rows { scaling.r[i] } else { 1.0 };
                    self.a[i + j * n] *= ri * cj;
                }
            }
        }
        self.factor_scaled()
    }

    /// Factor the matrix as given, discarding any computed scaling
    pub fn factor(&mut self) -> Info {
        let info = self.check_args();
        if !info.is_ok() {
            return info;
        }
        self.scaling = None;
        self.factor_scaled()
    }

    #[cfg(not(feature = "ndarray-linalg"))]
    fn factor_scaled(&mut self) -> Info {
        self.solved = false;
        let info = self.getrf();
        self.factored = info.is_ok();
        info
    }

    #[cfg(feature = "ndarray-linalg")]
    fn factor_scaled(&mut self) -> Info {
        use ndarray::{Array2, ShapeBuilder};
        use ndarray_linalg::FactorizeInto;

        self.solved = false;
        self.factored = false;
        let n = self.n;
        let floor = self.pivot_floor();
        let matrix = match Array2::from_shape_vec((n, n).f(), self.a.clone()) {
            Ok(m) => m,
            Err(_) => return Info::bad_argument(1),
        };
        match matrix.factorize_into() {
            Ok(lu) => {
                // LAPACK only rejects exact zeros
                if let Some(k) = (0..n).find(|&k| {
                    let u = lu.a[[k, k]].abs();
                    u <= floor || !u.is_finite()
                }) {
                    return Info::zero_pivot(k);
                }
                self.lapack = Some(lu);
                self.factored = true;
                Info::OK
            }
            Err(e) => {
                log::debug!("LAPACK getrf failed: {e}");
                Info::zero_pivot(n.saturating_sub(1))
            }
        }
    }

    /// Smallest pivot magnitude accepted: `ε · max|A|` of the matrix being
    /// factored, the same floor as the reference LU and the sparse engine
    fn pivot_floor(&self) -> f64 {
        self.a.iter().fold(0.0_f64, |m, v| m.max(v.abs())) * f64::EPSILON
    }

    /// Right-looking LU with partial pivoting, in place
    #[cfg_attr(feature = "ndarray-linalg", allow(dead_code))]
    fn getrf(&mut self) -> Info {
        let n = self.n;
        let ctx = self.ctx;
        let floor = self.pivot_floor();
        self.ipiv = (0..n).collect();

        for k in 0..n {
            let col_k = &self.a[k * n..(k + 1) * n];
            let (p, pivot_abs) = (k..n)
                .map(|i| (i, col_k[i].abs()))
                .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
            self.ipiv[k] = p;

            if pivot_abs <= floor || !pivot_abs.is_finite() {
                return Info::zero_pivot(k);
            }

            if p != k {
                for j in 0..n {
                    self.a.swap(k + j * n, p + j * n);
                }
            }

            let pivot = self.a[k + k * n];
            for v in &mut self.a[k * n + k + 1..(k + 1) * n] {
                *v /= pivot;
            }

            let (left, trailing) = self.a.split_at_mut((k + 1) * n);
            let multipliers = &left[k * n..];
            let update = |column: &mut [f64]| {
                let akj = column[k];
                if akj != 0.0 {
                    for i in (k + 1)..n {
                        column[i] -= multipliers[i] * akj;
                    }
                }
            };

            let remaining = n - k - 1;
            if ctx.is_parallel() && remaining >= PARALLEL_MIN_COLUMNS {
                ctx.install(|| parallel_chunks_mut(trailing, n, update));
            } else {
                trailing.chunks_mut(n).for_each(update);
            }
        }

        Info::OK
    }

    /// Overwrite `b` with the solution of the factored (scaled) system
    ///
    /// When rows were scaled, `b` is scaled by `r` first. The result is the
    /// solution `y` of the scaled system; call
    /// [`unequilibrate_lhs`](Self::unequilibrate_lhs) to recover `x`.
    pub fn solve(&mut self, b: &mut [f64]) -> Info {
        self.solved = false;
        if !self.factored {
            return Info::bad_argument(1);
        }
        if b.len() != self.n {
            return Info::bad_argument(2);
        }

        if let Some(scaling) = &self.scaling {
            if matches!(scaling.equed, Equed::Row | Equed::Both) {
                for (bi, ri) in b.iter_mut().zip(&scaling.r) {
                    *bi *= ri;
                }
            }
        }

        let info = self.getrs(b);
        self.solved = info.is_ok();
        info
    }

    #[cfg(not(feature = "ndarray-linalg"))]
    fn getrs(&self, b: &mut [f64]) -> Info {
        let n = self.n;
        for (k, &p) in self.ipiv.iter().enumerate() {
            if p != k {
                b.swap(k, p);
            }
        }
        // L y = P b, unit diagonal
        for j in 0..n {
            let yj = b[j];
            if yj != 0.0 {
                let column = &self.a[j * n..(j + 1) * n];
                for i in (j + 1)..n {
                    b[i] -= column[i] * yj;
                }
            }
        }
        // U x = y
        for j in (0..n).rev() {
            let column = &self.a[j * n..(j + 1) * n];
            b[j] /= column[j];
            let xj = b[j];
            if xj != 0.0 {
                for i in 0..j {
                    b[i] -= column[i] * xj;
                }
            }
        }
        Info::OK
    }

    #[cfg(feature = "ndarray-linalg")]
    fn getrs(&self, b: &mut [f64]) -> Info {
        use ndarray::ArrayViewMut1;
        use ndarray_linalg::Solve;

        let Some(lu) = &self.lapack else {
            return Info::bad_argument(1);
        };
        let mut rhs = ArrayViewMut1::from(b);
        match lu.solve_inplace(&mut rhs) {
            Ok(_) => Info::OK,
            Err(e) => {
                log::debug!("LAPACK getrs failed: {e}");
                Info::bad_argument(2)
            }
        }
    }

    /// Undo column scaling on a solution: `x = diag(c) y`
    pub fn unequilibrate_lhs(&self, x: &mut [f64]) {
        if let Some(scaling) = &self.scaling {
            if matches!(scaling.equed, Equed::Column | Equed::Both) {
                for (xj, cj) in x.iter_mut().zip(&scaling.c) {
                    *xj *= cj;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::transpose;
    use approx::assert_relative_eq;

    fn solve_row_major(ctx: &ExecutionContext, a: &[f64], b: &[f64], n: usize, eq: bool) -> Vec<f64> {
        let mut engine = DenseEngine::new(ctx, transpose(a, n).unwrap(), n);
        let info = if eq {
            engine.factor_with_equilibration()
        } else {
            engine.factor()
        };
        assert!(info.is_ok(), "{info}");
        let mut x = b.to_vec();
        assert!(engine.solve(&mut x).is_ok());
        assert!(engine.solved());
        engine.unequilibrate_lhs(&mut x);
        x
    }

    #[test]
    fn test_solve_2x2() {
        let ctx = ExecutionContext::serial();
        let x = solve_row_major(&ctx, &[4.0, 3.0, 6.0, 3.0], &[1.0, 2.0], 2, false);
        assert_relative_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(x[1], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_with_forced_equilibration() {
        let ctx = ExecutionContext::serial();
        let a = [1e6, 2.0, 3e-4, 4e-6];
        let b = [1e6 + 2.0, 3e-4 + 4e-6];
        let x = solve_row_major(&ctx, &a, &b, 2, true);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_should_equilibrate() {
        let ctx = ExecutionContext::serial();

        let mut well = DenseEngine::new(&ctx, vec![2.0, 1.0, 1.0, 3.0], 2);
        assert!(!well.should_equilibrate());
        assert_eq!(well.equed(), Equed::None);

        // Row 1 is six orders of magnitude smaller than row 0
        let a = transpose(&[1e3, 2e3, 1e-3, 3e-3], 2).unwrap();
        let mut badly = DenseEngine::new(&ctx, a, 2);
        assert!(badly.should_equilibrate());
        assert_ne!(badly.equed(), Equed::None);
        assert!(badly.factor_with_equilibration().is_ok());

        let mut x = vec![3e3, 4e-3];
        assert!(badly.solve(&mut x).is_ok());
        badly.unequilibrate_lhs(&mut x);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_row_is_not_equilibrated() {
        let ctx = ExecutionContext::serial();
        let mut engine = DenseEngine::new(&ctx, vec![1.0, 0.0, 2.0, 0.0], 2);
        assert!(!engine.should_equilibrate());
    }

    #[cfg(not(feature = "ndarray-linalg"))]
    #[test]
    fn test_singular_reports_column() {
        let ctx = ExecutionContext::serial();
        let a = transpose(&[1.0, 2.0, 2.0, 4.0], 2).unwrap();
        let mut engine = DenseEngine::new(&ctx, a, 2);
        let info = engine.factor();
        assert_eq!(info.code(), 2);
        assert_eq!(info.singular_column(), Some(1));

        let mut b = vec![1.0, 2.0];
        assert!(!engine.solve(&mut b).is_ok());
        assert!(!engine.solved());
    }

    #[test]
    fn test_numerically_singular_rejected() {
        // Last pivot of [1..9] is about 1e-16 instead of zero
        let ctx = ExecutionContext::serial();
        let a = transpose(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 3).unwrap();
        let mut engine = DenseEngine::new(&ctx, a, 3);
        let info = engine.factor();
        assert!(!info.is_ok());
        assert_eq!(info.singular_column(), Some(2));

        let mut b = vec![1.0, 0.0, 0.0];
        assert!(!engine.solve(&mut b).is_ok());
        assert!(!engine.solved());
    }

    #[test]
    fn test_bad_arguments() {
        let ctx = ExecutionContext::serial();
        let mut engine = DenseEngine::new(&ctx, vec![1.0, 2.0, 3.0], 2);
        assert_eq!(engine.factor().code(), -1);

        let mut engine = DenseEngine::new(&ctx, vec![1.0, 0.0, 0.0, 1.0], 2);
        let mut b = vec![1.0, 2.0];
        assert_eq!(engine.solve(&mut b).code(), -1);
        assert!(engine.factor().is_ok());
        let mut short = vec![1.0];
        assert_eq!(engine.solve(&mut short).code(), -2);
    }

    #[test]
    fn test_info_display() {
        assert_eq!(Info::OK.to_string(), "info = 0");
        assert!(Info::zero_pivot(2).to_string().contains("U(3,3)"));
        assert!(Info::bad_argument(2).to_string().contains("argument 2"));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_update_matches_serial() {
        let n = 150;
        let a: Vec<f64> = (0..n * n)
            .map(|k| {
                let (i, j) = (k / n, k % n);
                if i == j {
                    n as f64
                } else {
                    (((i * 31 + j * 17) % 13) as f64 - 6.0) / 7.0
                }
            })
            .collect();
        let b: Vec<f64> = (0..n).map(|i| (i % 5) as f64 - 2.0).collect();

        let serial = ExecutionContext::serial();
        let threads = ExecutionContext::threads(3).unwrap();
        let xs = solve_row_major(&serial, &a, &b, n, false);
        let xt = solve_row_major(&threads, &a, &b, n, false);
        for i in 0..n {
            assert_relative_eq!(xs[i], xt[i], epsilon = 1e-12);
        }
    }
}
