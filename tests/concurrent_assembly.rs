#![allow(non_snake_case)]

use sparsela::algebra::*;
use std::thread;

// 4x4 pattern with the diagonal and both off diagonals
fn tridiagonal_pattern(n: usize) -> SparsityPattern {
    let mut pattern = SparsityPattern::diagonal(n);
    for i in 0..n {
        if i > 0 {
            pattern.insert(i, i - 1);
        }
        if i + 1 < n {
            pattern.insert(i, i + 1);
        }
    }
    pattern
}

#[test]
fn test_four_threads_own_rows() {
    let pattern = tridiagonal_pattern(4);
    let mut A = CsrMatrix::<f64>::new(4, 4, &pattern, 4).unwrap();
    assert_eq!(A.num_mutexes(), 4);

    let assembler = A.assembler();
    assert_eq!(assembler.num_mutexes(), 4);
    thread::scope(|s| {
        for i in 0..4 {
            let assembler = &assembler;
            s.spawn(move || {
                for _ in 0..100 {
                    assembler.add_to_entry(i, i, 1.0).unwrap();
                }
            });
        }
    });

    for i in 0..4 {
        assert_eq!(A.get_entry(i, i), 100.0);
    }
    assert_eq!(A.sup_norm(), 100.0);
}

#[test]
fn test_colliding_rows_serialize() {
    // 2 stripes for 4 rows, and every thread hits every row
    let pattern = tridiagonal_pattern(4);
    for format in [SparseFormat::Csr, SparseFormat::Csc] {
        let mut csr = CsrMatrix::<f64>::new(4, 4, &pattern, 2).unwrap();
        let mut csc = CscMatrix::<f64>::new(4, 4, &pattern, 2).unwrap();
        let assembler = match format {
            SparseFormat::Csr => csr.assembler(),
            SparseFormat::Csc => csc.assembler(),
        };
        thread::scope(|s| {
            for _ in 0..8 {
                let assembler = &assembler;
                s.spawn(move || {
                    for _ in 0..250 {
                        for i in 0..4 {
                            assembler.add_to_entry(i, i, 1.0).unwrap();
                        }
                        assembler.add_to_entry(1, 0, 0.5).unwrap();
                    }
                });
            }
        });
        assert_eq!(assembler.get_entry(3, 3), 2000.0);
        assert_eq!(assembler.get_entry(1, 0), 1000.0);
        assert_eq!(assembler.get_entry(0, 3), 0.0);
    }
}

#[test]
fn test_assembler_rejects_missing_cells() {
    let mut A = CscMatrix::<f64>::new(4, 4, &tridiagonal_pattern(4), 4).unwrap();
    let assembler = A.assembler();
    assert_eq!(
        assembler.add_to_entry(0, 3, 1.0),
        Err(MatrixError::IndexOutOfRange { row: 0, col: 3 })
    );
    assert!(assembler.add_to_entry(3, 2, 1.0).is_ok());
    assert_eq!(A.get_entry(3, 2), 1.0);
}

#[test]
fn test_assembler_breaks_sharing() {
    let mut A = CsrMatrix::<f64>::new(4, 4, &tridiagonal_pattern(4), 2).unwrap();
    let B = A.copy();
    {
        let assembler = A.assembler();
        assembler.add_to_entry(2, 2, 3.0).unwrap();
    }
    assert_eq!(A.get_entry(2, 2), 3.0);
    assert_eq!(B.get_entry(2, 2), 0.0);
    assert!(!A.shares_buffers_with(&B));
}

#[test]
fn test_shared_copies_read_across_threads() {
    let D = DenseMatrix::from(&[
        [2.0, 1.0], //
        [0.0, 3.0],
    ]);
    let A = CsrMatrix::from_matrix(&D, true, 1e-18, 1);
    thread::scope(|s| {
        for k in 0..4 {
            let B = A.copy();
            s.spawn(move || {
                let x = [k as f64, 1.0];
                let mut y = [0.0; 2];
                B.mv(&x, &mut y);
                assert_eq!(y, [2.0 * k as f64 + 1.0, 3.0]);
            });
        }
    });
}
