//! GMRES (Generalized Minimal Residual) solver
//!
//! Implementation of the restarted GMRES algorithm based on Saad & Schultz (1986).
//!
//! GMRES is often the best choice for large non-symmetric systems.
//! It minimizes the residual in a Krylov subspace and has smooth, monotonic
//! convergence behavior.

use crate::blas_helpers::{axpy, inner_product, scale_inplace, vector_norm};
use crate::traits::{LinearOperator, Preconditioner, RealField};
use ndarray::{Array1, Array2};

/// GMRES solver configuration
#[derive(Debug, Clone)]
pub struct GmresConfig<R> {
    /// Total number of inner iterations (matrix-vector products) across
    /// all restarts
    pub max_iterations: usize,
    /// Restart parameter (number of inner iterations before restart)
    pub restart: usize,
    /// Relative tolerance for convergence
    pub tolerance: R,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for GmresConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            restart: 30,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// GMRES solver result
#[derive(Debug)]
pub struct GmresSolution<T: RealField> {
    /// Solution vector
    pub x: Array1<T>,
    /// Total number of inner iterations
    pub iterations: usize,
    /// Number of restarts performed
    pub restarts: usize,
    /// Final relative residual of the (preconditioned) system
    pub residual: T,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// GMRES solver with preconditioner
///
/// Solves Ax = b using left preconditioning: M⁻¹Ax = M⁻¹b
pub fn gmres_preconditioned<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    config: &GmresConfig<T>,
) -> GmresSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
    P: Preconditioner<T>,
{
    gmres_preconditioned_with_guess(operator, precond, b, None, config)
}

/// GMRES solver with preconditioner and initial guess
///
/// Solves Ax = b using left preconditioning: M⁻¹Ax = M⁻¹b
/// with an optional initial guess x0. Convergence is measured on the
/// preconditioned residual `||M⁻¹(b - Ax)|| / ||M⁻¹b||`.
pub fn gmres_preconditioned_with_guess<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    x0: Option<&Array1<T>>,
    config: &GmresConfig<T>,
) -> GmresSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
    P: Preconditioner<T>,
{
    let n = b.len();
    let m = config.restart.max(1);

    let mut x = match x0 {
        Some(guess) => guess.clone(),
        None => Array1::from_elem(n, T::zero()),
    };

    let pb = precond.apply(b);
    let b_norm = vector_norm(&pb);
    if b_norm < T::lit(1e-15) {
        // Zero right-hand side: the zero vector is the exact solution
        return GmresSolution {
            x: Array1::from_elem(n, T::zero()),
            iterations: 0,
            restarts: 0,
            residual: T::zero(),
            converged: true,
        };
    }

    let breakdown_tol = T::lit(1e-14);
    let mut total_iterations = 0;
    let mut restarts = 0;

    loop {
        // Preconditioned residual r = M⁻¹(b - Ax)
        let residual: Array1<T> = b - &operator.apply(&x);
        let r = precond.apply(&residual);
        let beta = vector_norm(&r);

        let rel_residual = beta / b_norm;
        if rel_residual < config.tolerance {
            return GmresSolution {
                x,
                iterations: total_iterations,
                restarts,
                residual: rel_residual,
                converged: true,
            };
        }
        if total_iterations >= config.max_iterations {
            return GmresSolution {
                x,
                iterations: total_iterations,
                restarts,
                residual: rel_residual,
                converged: false,
            };
        }

        let mut v: Vec<Array1<T>> = Vec::with_capacity(m + 1);
        let mut v0 = r;
        scale_inplace(&mut v0, T::one() / beta);
        v.push(v0);

        let mut h: Array2<T> = Array2::zeros((m + 1, m));
        let mut cs: Vec<T> = Vec::with_capacity(m);
        let mut sn: Vec<T> = Vec::with_capacity(m);

        let mut g: Array1<T> = Array1::zeros(m + 1);
        g[0] = beta;

        let mut steps = 0;
        let mut stop = false;
        let mut breakdown = false;

        for j in 0..m {
            if total_iterations >= config.max_iterations {
                break;
            }
            total_iterations += 1;
            steps = j + 1;

            // w = M⁻¹ * A * v_j
            let mut w = precond.apply(&operator.apply(&v[j]));

            // Modified Gram-Schmidt
            for i in 0..=j {
                let h_ij = inner_product(&v[i], &w);
                h[[i, j]] = h_ij;
                axpy(-h_ij, &v[i], &mut w);
            }

            let w_norm = vector_norm(&w);
            h[[j + 1, j]] = w_norm;

            breakdown = w_norm < breakdown_tol;
            if !breakdown {
                scale_inplace(&mut w, T::one() / w_norm);
                v.push(w);
            }

            // Apply previous Givens rotations to the new column
            for i in 0..j {
                let temp = cs[i] * h[[i, j]] + sn[i] * h[[i + 1, j]];
                h[[i + 1, j]] = -sn[i] * h[[i, j]] + cs[i] * h[[i + 1, j]];
                h[[i, j]] = temp;
            }

            let (c, s) = givens_rotation(h[[j, j]], h[[j + 1, j]]);
            cs.push(c);
            sn.push(s);

            h[[j, j]] = c * h[[j, j]] + s * h[[j + 1, j]];
            h[[j + 1, j]] = T::zero();

            let temp = c * g[j] + s * g[j + 1];
            g[j + 1] = -s * g[j] + c * g[j + 1];
            g[j] = temp;

            let rel_residual = g[j + 1].abs() / b_norm;

            if config.print_interval > 0 && total_iterations % config.print_interval == 0 {
                log::info!(
                    "GMRES iteration {} (restart {}): relative residual = {:.6e}",
                    total_iterations,
                    restarts,
                    rel_residual.to_report()
                );
            }

            if rel_residual < config.tolerance || breakdown {
                stop = true;
                break;
            }
        }

        // x = x + V y with H y = g on the steps taken in this cycle
        let y = solve_upper_triangular(&h, &g, steps);
        for (i, &yi) in y.iter().enumerate() {
            axpy(yi, &v[i], &mut x);
        }

        if stop {
            // The least-squares estimate can be wrong; trust only the
            // recomputed residual
            let residual: Array1<T> = b - &operator.apply(&x);
            let rel_residual = vector_norm(&precond.apply(&residual)) / b_norm;
            let converged = rel_residual < config.tolerance;
            if converged {
                log::debug!(
                    "GMRES converged after {} iterations ({} restarts)",
                    total_iterations,
                    restarts
                );
            } else if breakdown {
                // Krylov space is invariant, b is outside the range of M⁻¹A
                log::debug!(
                    "GMRES breakdown after {} iterations, relative residual {:.3e}",
                    total_iterations,
                    rel_residual.to_report()
                );
            }
            if converged || breakdown {
                return GmresSolution {
                    x,
                    iterations: total_iterations,
                    restarts,
                    residual: rel_residual,
                    converged,
                };
            }
        }

        restarts += 1;
    }
}

/// Compute Givens rotation coefficients
#[inline]
fn givens_rotation<T: RealField>(a: T, b: T) -> (T, T) {
    let tol = T::lit(1e-30);
    if b.abs() < tol {
        return (T::one(), T::zero());
    }
    if a.abs() < tol {
        return (T::zero(), T::one());
    }

    let r = a.hypot(b);
    (a / r, b / r)
}

/// Solve upper triangular system Hy = g
fn solve_upper_triangular<T: RealField>(h: &Array2<T>, g: &Array1<T>, k: usize) -> Vec<T> {
    let mut y = vec![T::zero(); k];
    let tol = T::lit(1e-30);

    for i in (0..k).rev() {
        let mut sum = g[i];
        for j in (i + 1)..k {
            sum -= h[[i, j]] * y[j];
        }
        if h[[i, i]].abs() > tol {
            y[i] = sum / h[[i, i]];
        }
    }

    y
}
