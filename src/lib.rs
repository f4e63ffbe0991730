//! __sparsela__ is a sparse matrix engine for numerical codes that assemble
//! large matrices from many writers and multiply them repeatedly.
//!
//! It provides:
//!
//! * compressed sparse row and column matrices ([`CsrMatrix`](algebra::CsrMatrix),
//!   [`CscMatrix`](algebra::CscMatrix)) over a fixed
//!   [`SparsityPattern`](algebra::SparsityPattern),
//! * a column major [`DenseMatrix`](algebra::DenseMatrix),
//! * an adaptive [`SparseOrDenseMatrix`](algebra::SparseOrDenseMatrix) that
//!   picks sparse or dense storage from the density seen at construction,
//! * generic arithmetic over any mix of the above through
//!   [`MatrixAlgebra`](algebra::MatrixAlgebra).
//!
//! Copies share their buffers until one of them is written to
//! (copy-on-write), so passing matrices around by value is cheap.  Sparse
//! matrices carry a fixed set of stripe locks, and a
//! [`StripedAssembler`](algebra::StripedAssembler) lets several threads
//! accumulate into distinct rows in parallel.
//!
//! ```
//! use sparsela::algebra::*;
//!
//! let mut pattern = SparsityPattern::new(3);
//! pattern.insert(0, 0);
//! pattern.insert(1, 1);
//! pattern.insert(2, 2);
//! pattern.insert(0, 2);
//!
//! let mut A = CsrMatrix::<f64>::new(3, 3, &pattern, 1).unwrap();
//! A.set_entry(0, 0, 2.0).unwrap();
//! A.set_entry(0, 2, 1.0).unwrap();
//! A.set_entry(2, 2, 4.0).unwrap();
//!
//! // entries outside the pattern read as zero and can't be written
//! assert_eq!(A.get_entry(1, 0), 0.0);
//! assert!(A.set_entry(1, 0, 1.0).is_err());
//!
//! let mut y = vec![0.0; 3];
//! A.mv(&[1.0, 1.0, 1.0], &mut y);
//! assert_eq!(y, vec![3.0, 0.0, 4.0]);
//! ```
//!
//! # Logging
//!
//! Copy-on-write splits, storage decisions and product rebuilds are
//! reported through the [`log`](https://docs.rs/log) facade at `debug`
//! level.  No logger is installed by the crate.

#![allow(non_snake_case)]

pub mod algebra;
pub mod settings;

#[cfg(feature = "serde")]
pub mod io;
