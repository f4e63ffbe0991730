#![allow(non_snake_case)]
use crate::algebra::*;

fn test_matrix_3x4() -> DenseMatrix<f64> {
    // A =
    //[ 1.0   ⋅   2.0   ⋅ ]
    //[  ⋅    ⋅    ⋅    ⋅ ]
    //[ -1.0 3.0   ⋅   4.0]
    DenseMatrix::from(&[
        [1.0, 0.0, 2.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
        [-1.0, 3.0, 0.0, 4.0],
    ])
}

#[test]
fn test_mv_sparse() {
    let D = test_matrix_3x4();
    let A = CsrMatrix::from_matrix(&D, true, 1e-18, 1);
    let B = CscMatrix::from_matrix(&D, true, 1e-18, 1);

    let x = SparseVector::new(&[0.0, 2.0, 1.0, 0.0]);
    assert_eq!(x.nnz(), 2);

    let ya = A.mv_sparse(&x);
    let yb = B.mv_sparse(&x);
    assert_eq!(ya, yb);
    assert_eq!(ya.nzind, vec![0, 2]);
    assert_eq!(Vec::from(ya), vec![2.0, 0.0, 6.0]);

    let z = SparseVector::new(&[1.0, 5.0, 0.0]);
    let za = A.mtv_sparse(&z);
    let zb = B.mtv_sparse(&z);
    assert_eq!(za, zb);
    assert_eq!(Vec::from(za), vec![1.0, 0.0, 2.0, 0.0]);
}

#[test]
fn test_mv_sparse_matches_dense() {
    let D = test_matrix_3x4();
    let A = CsrMatrix::from_matrix(&D, true, 1e-18, 1);
    let xd = [1.0, -1.0, 0.0, 0.5];
    let mut y = [0.0; 3];
    A.mv(&xd, &mut y);
    let ys: Vec<f64> = A.mv_sparse(&SparseVector::new(&xd)).into();
    assert_eq!(ys, y.to_vec());
}

#[test]
fn test_gemv_scaling() {
    let D = test_matrix_3x4();
    let A = CsrMatrix::from_matrix(&D, true, 1e-18, 1);
    let B = A.to_csc();
    let x = [1.0, 1.0, 1.0, 1.0];

    let ops: [&dyn MatrixVectorMultiply<T = f64>; 3] = [&A, &B, &D];
    for M in ops {
        let mut y = vec![1.0, 1.0, 1.0];
        M.gemv(&mut y, &x, 2.0, -1.0);
        assert_eq!(y, vec![5.0, -1.0, 11.0]);

        // b = 0 overwrites y, including NaN
        let mut y = vec![f64::NAN; 3];
        M.gemv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![3.0, 0.0, 6.0]);

        let mut z = vec![1.0; 4];
        M.gemtv(&mut z, &[1.0, 1.0, 1.0], -1.0, 1.0);
        assert_eq!(z, vec![1.0, -2.0, -1.0, -3.0]);
    }
}

#[test]
fn test_rightmultiply_prunes() {
    // the product cancels exactly in (0,0) and (1,1)
    let A = DenseMatrix::from(&[
        [1.0, 1.0], //
        [0.0, 1.0],
    ]);
    let B = DenseMatrix::from(&[
        [1.0, 2.0], //
        [-1.0, 0.0],
    ]);
    let mut C = CsrMatrix::from_matrix(&A, true, 1e-18, 1);
    C.rightmultiply(&B).unwrap();
    assert_eq!(C.nnz(), 2);
    assert_eq!(C.get_entry(0, 0), 0.0);
    assert_eq!(C.get_entry(0, 1), 2.0);
    assert_eq!(C.get_entry(1, 0), -1.0);
    assert!(C.check_format().is_ok());

    let mut E = CscMatrix::from_matrix(&A, true, 1e-18, 1);
    E.rightmultiply_sparse(&CscMatrix::from_matrix(&B, true, 1e-18, 1))
        .unwrap();
    assert_eq!(E.nnz(), 2);
    assert!(E.almost_equal(&C, 0.0).unwrap());
}

#[test]
fn test_rightmultiply_changes_shape() {
    let A = CsrMatrix::from_matrix(&test_matrix_3x4(), true, 1e-18, 2);
    let R = DenseMatrix::from(&[
        [1.0, 0.0], //
        [0.0, 1.0],
        [1.0, 0.0],
        [0.0, 1.0],
    ]);
    let mut B = A.copy();
    B.rightmultiply(&R).unwrap();
    assert_eq!((B.nrows(), B.ncols()), (3, 2));
    assert_eq!(B.get_entry(0, 0), 3.0);
    assert_eq!(B.get_entry(2, 1), 7.0);
    assert_eq!(B.num_mutexes(), 2);
    // A is untouched
    assert_eq!((A.nrows(), A.ncols()), (3, 4));

    let mut C = A.to_csc();
    C.rightmultiply(&R).unwrap();
    assert!(C.almost_equal(&B, 0.0).unwrap());
    assert!(C.check_format().is_ok());

    let mut D = test_matrix_3x4();
    D.rightmultiply(&R).unwrap();
    assert!(D.almost_equal(&B, 0.0).unwrap());
}

#[test]
fn test_scal_and_axpy() {
    let D = test_matrix_3x4();
    let mut A = CsrMatrix::from_matrix(&D, true, 1e-18, 3);
    let B = A.copy();
    A.scal(2.0);
    A.axpy(-1.0, &B).unwrap();
    assert!(A.almost_equal(&B, 0.0).unwrap());

    // x may alias self
    let C = A.clone();
    A.axpy(1.0, &C).unwrap();
    assert_eq!(A.get_entry(2, 3), 8.0);

    let I = CsrMatrix::<f64>::identity(3);
    assert!(matches!(
        A.axpy(1.0, &I),
        Err(MatrixError::ShapesDoNotMatch(_))
    ));
    assert!(A.valid());
    A.set_entry(0, 0, f64::INFINITY).unwrap();
    assert!(!A.valid());
}
