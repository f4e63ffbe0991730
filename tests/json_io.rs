#![allow(non_snake_case)]

#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use sparsela::{algebra::*, io::MatrixJSONReadWrite};
    use std::io::{Seek, SeekFrom};

    let D = DenseMatrix::from(&[
        [4.0, 0.0, 1.0], //
        [0.0, 0.0, -2.5],
        [1e-3, 7.0, 0.0],
    ]);
    let A = CscMatrix::from_matrix(&D, true, 1e-12, 3);

    // write the matrix to a file
    let mut file = tempfile::tempfile().unwrap();
    A.save_to_file(&mut file).unwrap();

    // read it back
    file.seek(SeekFrom::Start(0)).unwrap();
    let B = CscMatrix::<f64>::load_from_file(&mut file).unwrap();
    assert!(B.almost_equal(&A, 0.0).unwrap());
    assert_eq!(B.column_offsets(), A.column_offsets());
    assert_eq!(B.row_indices(), A.row_indices());
    assert_eq!(B.num_mutexes(), 3);
    assert_eq!(B.eps(), 1e-12);

    // the loaded matrix owns its buffers
    assert!(!B.is_shared());

    // same through CSR
    let C = A.to_csr();
    let mut file = tempfile::tempfile().unwrap();
    C.save_to_file(&mut file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let E = CsrMatrix::<f64>::load_from_file(&mut file).unwrap();
    assert_eq!(E.to_dense(), A.to_dense());
}

#[cfg(feature = "serde")]
#[test]
fn test_json_io_truncated_file() {
    use sparsela::{algebra::*, io::MatrixJSONReadWrite};
    use std::io::{Seek, SeekFrom, Write};

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(br#"{"m":2,"n":2,"offsets":[0,1"#).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    assert!(CsrMatrix::<f64>::load_from_file(&mut file).is_err());
}
