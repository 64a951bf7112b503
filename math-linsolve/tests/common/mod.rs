//! Shared fixtures for the integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random row-major system whose diagonal dominates each row
pub fn dominant_system(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();
    for i in 0..n {
        let off: f64 = (0..n).filter(|&j| j != i).map(|j| a[i * n + j].abs()).sum();
        a[i * n + i] = off + 1.0 + rng.random_range(0.0..1.0);
    }
    let b = (0..n).map(|_| rng.random_range(-10.0..10.0)).collect();
    (a, b)
}

/// Random vector of length `n`
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(-5.0..5.0)).collect()
}

/// `||b - A x|| / ||b||`
pub fn relative_residual(a: &[f64], x: &[f64], b: &[f64], n: usize) -> f64 {
    let r = math_linsolve::arithmetic::residual_norm(a, x, b, n).unwrap();
    let b_norm = math_linsolve::norm(b);
    if b_norm > 0.0 { r / b_norm } else { r }
}

/// Largest absolute componentwise difference
pub fn max_abs_diff(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()))
}
