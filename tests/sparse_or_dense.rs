#![allow(non_snake_case)]

use sparsela::{algebra::*, settings::*};

fn banded_pattern(n: usize, bandwidth: usize) -> SparsityPattern {
    let mut pattern = SparsityPattern::new(n);
    for r in 0..n {
        for c in r.saturating_sub(bandwidth)..(r + bandwidth + 1).min(n) {
            pattern.insert(r, c);
        }
    }
    pattern
}

#[test]
fn test_storage_follows_density() {
    let settings = MatrixSettings::<f64>::default();

    // 28 of 100 cells
    let pattern = banded_pattern(10, 1);
    let A = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csr, &settings).unwrap();
    assert!(!A.is_sparse());
    assert!(matches!(A.storage(), ActiveStorage::DenseMatrix(_)));

    // 148 of 2500 cells
    let pattern = banded_pattern(50, 1);
    let B = SparseOrDenseMatrix::new(50, 50, &pattern, SparseFormat::Csr, &settings).unwrap();
    assert!(B.is_sparse());
    assert!(matches!(B.storage(), ActiveStorage::CsrMatrix(_)));
    assert_eq!(B.non_zeros(), 148);
    assert_eq!(B.format(), SparseFormat::Csr);

    let settings = MatrixSettingsBuilder::<f64>::default()
        .sparse_limit(0.5)
        .build()
        .unwrap();
    let C = SparseOrDenseMatrix::new(10, 10, &banded_pattern(10, 1), SparseFormat::Csc, &settings)
        .unwrap();
    assert!(matches!(C.storage(), ActiveStorage::CscMatrix(_)));
}

#[test]
fn test_same_results_either_storage() {
    let pattern = banded_pattern(12, 2);
    let sparse = MatrixSettingsBuilder::<f64>::default()
        .sparse_limit(1.0)
        .num_mutexes(3)
        .build()
        .unwrap();
    let dense = MatrixSettingsBuilder::<f64>::default()
        .sparse_limit(0.01)
        .build()
        .unwrap();

    let mut A = SparseOrDenseMatrix::new(12, 12, &pattern, SparseFormat::Csc, &sparse).unwrap();
    let mut B = SparseOrDenseMatrix::new(12, 12, &pattern, SparseFormat::Csc, &dense).unwrap();
    assert!(A.is_sparse());
    assert!(!B.is_sparse());

    for (r, row) in pattern.iter().enumerate() {
        for &c in row {
            let v = (r as f64) - 0.5 * (c as f64);
            A.set_entry(r, c, v).unwrap();
            B.set_entry(r, c, v).unwrap();
        }
    }
    A.add_to_entry(4, 5, 1.0).unwrap();
    B.add_to_entry(4, 5, 1.0).unwrap();
    A.unit_row(7).unwrap();
    B.unit_row(7).unwrap();
    A.clear_col(0);
    B.clear_col(0);

    let x: Vec<f64> = (0..12).map(|i| 1.0 / (i as f64 + 1.0)).collect();
    let (mut ya, mut yb) = (vec![0.0; 12], vec![0.0; 12]);
    A.mv(&x, &mut ya);
    B.mv(&x, &mut yb);
    for (a, b) in ya.iter().zip(yb.iter()) {
        assert!((a - b).abs() < 1e-14);
    }
    A.mtv(&x, &mut ya);
    B.mtv(&x, &mut yb);
    for (a, b) in ya.iter().zip(yb.iter()) {
        assert!((a - b).abs() < 1e-14);
    }
    assert!(A.almost_equal(&B, 0.0).unwrap());
    assert_eq!(A.sup_norm(), B.sup_norm());

    // only the sparse one rejects cells outside the pattern
    assert!(A.set_entry(0, 11, 1.0).is_err());
    assert!(B.set_entry(0, 11, 1.0).is_ok());
}

#[test]
fn test_from_matrix_counts_with_tolerance() {
    let settings = MatrixSettings::<f64>::default();
    let mut D = DenseMatrix::<f64>::zeros((10, 10));
    D[(0, 0)] = 1.0;
    // tiny values do not count towards the density
    for c in 0..10 {
        D[(5, c)] = 1e-25;
    }
    let A = SparseOrDenseMatrix::from_matrix(&D, true, SparseFormat::Csr, &settings);
    assert!(A.is_sparse());
    assert_eq!(A.non_zeros(), 1);

    let B = SparseOrDenseMatrix::from_matrix(&D, false, SparseFormat::Csr, &settings);
    assert!(B.is_sparse());
    assert_eq!(B.non_zeros(), 100);

    D.scal(0.0);
    for c in 0..10 {
        D[(5, c)] = 1.0;
    }
    let E = SparseOrDenseMatrix::from_matrix(&D, true, SparseFormat::Csc, &settings);
    assert!(!E.is_sparse());
}

#[test]
fn test_filled() {
    let settings = MatrixSettings::<f64>::default();
    let A = SparseOrDenseMatrix::filled(5, 6, 2.0, SparseFormat::Csc, &settings);
    assert!(!A.is_sparse());
    assert_eq!(A.get_entry(4, 5), 2.0);
    assert_eq!(A.size(), (5, 6));

    let Z = SparseOrDenseMatrix::filled(5, 6, 1e-20, SparseFormat::Csc, &settings);
    assert!(Z.is_sparse());
    assert_eq!(Z.non_zeros(), 0);
}

#[test]
fn test_algebra_keeps_settings() {
    let settings = MatrixSettingsBuilder::<f64>::default()
        .sparse_limit(0.5)
        .build()
        .unwrap();
    let mut A =
        SparseOrDenseMatrix::new(4, 4, &SparsityPattern::diagonal(4), SparseFormat::Csr, &settings)
            .unwrap();
    for i in 0..4 {
        A.set_entry(i, i, 2.0).unwrap();
    }
    let B = &A * &A;
    assert!(B.is_sparse());
    assert_eq!(B.get_entry(3, 3), 4.0);
    assert_eq!(B.settings(), &settings);

    let C = &A + &B;
    assert_eq!(C.get_entry(0, 0), 6.0);
    let mut E = C.transposed().unwrap();
    E -= &A;
    assert!(E.almost_equal(&B, 0.0).unwrap());
    assert_eq!(format!("{}", B).lines().count(), 4);
}
