//! Algebraic identities of the dense arithmetic

mod common;

use approx::assert_relative_eq;
use common::{dominant_system, random_vector};
use math_linsolve::arithmetic::{matmul, multiply_shaped, transpose};
use math_linsolve::{LinsolveError, Operand, Shape, cross, dot, multiply, multiply_into, solve};

#[test]
fn test_dot_is_symmetric() {
    for seed in 0..5 {
        let a = random_vector(9, seed);
        let b = random_vector(9, seed + 100);
        assert_eq!(dot(&a, &b).unwrap(), dot(&b, &a).unwrap());
    }
}

#[test]
fn test_cross_identities() {
    for seed in 0..5 {
        let a = random_vector(3, seed);
        let b = random_vector(3, seed + 50);
        let ab = cross(&a, &b).unwrap();
        let ba = cross(&b, &a).unwrap();
        for i in 0..3 {
            assert_eq!(ab[i], -ba[i]);
        }
        assert_relative_eq!(dot(&ab, &a).unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(dot(&ab, &b).unwrap(), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_cross_rejects_other_lengths() {
    let err = cross(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, LinsolveError::SizeMismatch { what: "a", expected: 3, got: 2 }));
}

#[test]
fn test_matvec_example() {
    assert_eq!(
        multiply(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0], 2).unwrap(),
        vec![17.0, 39.0]
    );
}

#[test]
fn test_matmul_is_row_major() {
    // [1 2] [5 6]   [19 22]
    // [3 4] [7 8] = [43 50]
    let x = multiply(&[1.0, 2.0, 3.0, 4.0], &[5.0, 6.0, 7.0, 8.0], 2).unwrap();
    assert_eq!(x, vec![19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn test_matmul_transpose_identity() {
    // (AB)^T = B^T A^T
    let n = 6;
    let a = random_vector(n * n, 1);
    let b = random_vector(n * n, 2);
    let lhs = transpose(&matmul(&a, &b, n).unwrap(), n).unwrap();
    let rhs = matmul(&transpose(&b, n).unwrap(), &transpose(&a, n).unwrap(), n).unwrap();
    for (l, r) in lhs.iter().zip(&rhs) {
        assert_relative_eq!(l, r, epsilon = 1e-12);
    }
}

#[test]
fn test_inverse_round_trip() {
    // A (A⁻¹ b) = b
    let n = 15;
    let (a, b) = dominant_system(n, 42);
    let x = solve(&a, &b, n).unwrap();
    let back = multiply(&a, &x, n).unwrap();
    for i in 0..n {
        assert_relative_eq!(back[i], b[i], epsilon = 1e-10);
    }
}

#[test]
fn test_n1_resolves_to_vector_product() {
    assert_eq!(multiply(&[3.0], &[4.0], 1).unwrap(), vec![12.0]);
    let shaped = multiply_shaped(Operand::matrix(&[3.0]), Operand::vector(&[4.0]), 1).unwrap();
    assert_eq!(shaped, vec![12.0]);
}

#[test]
fn test_huge_n_is_a_size_mismatch() {
    let n = usize::MAX / 2;
    assert!(matches!(
        multiply(&[1.0, 2.0], &[1.0, 2.0], n),
        Err(LinsolveError::SizeMismatch { .. })
    ));
    assert!(matches!(
        transpose(&[1.0], n),
        Err(LinsolveError::SizeMismatch { what: "A", .. })
    ));
}

#[test]
fn test_vector_times_matrix_unsupported() {
    let err = multiply(&[1.0, 2.0], &[1.0, 0.0, 0.0, 1.0], 2).unwrap_err();
    assert!(matches!(
        err,
        LinsolveError::UnsupportedShape {
            a: Shape::Vector,
            b: Shape::Matrix
        }
    ));
}

#[test]
fn test_multiply_into_leaves_x_on_error() {
    let mut x = vec![7.0; 3];
    assert!(multiply_into(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0], 2, &mut x).is_err());
    assert_eq!(x, vec![7.0; 3]);

    let mut x = vec![0.0; 2];
    multiply_into(&[1.0, 2.0, 3.0, 4.0], &[1.0, 1.0], 2, &mut x).unwrap();
    assert_eq!(x, vec![3.0, 7.0]);
}
