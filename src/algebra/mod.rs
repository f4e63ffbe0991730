//! Sparse and dense matrix containers and the algebra built on them.
//!
//! The containers are:
//!
//! * [`CsrMatrix`] and [`CscMatrix`]: compressed sparse row and column
//!   formats with a fixed sparsity pattern, copy-on-write buffers and
//!   striped locks for concurrent assembly.
//! * [`DenseMatrix`]: column major dense storage with a copy-on-write buffer.
//! * [`SparseOrDenseMatrix`]: chooses one of the above once, from the
//!   density observed at construction.
//!
//! All containers implement [`MatrixInterface`], from which the generic
//! [`MatrixAlgebra`] operations are derived.

mod error_types;
mod floats;
mod math_traits;
mod pattern;
mod vecmath;
pub use error_types::*;
pub use floats::{default_eps, AsFloatT, FloatT};
pub(crate) use floats::{is_nonzero, relative_tolerance};
pub use math_traits::*;
pub use pattern::*;

// matrix_interface must come before the enum_dispatch
// users in sparse_or_dense
mod matrix_interface;
pub(crate) use matrix_interface::fmt_matrix;
pub use matrix_interface::{MatrixAlgebra, MatrixInterface};

pub(crate) mod compressed;
pub use compressed::{SparseFormat, StripedAssembler};

mod csc;
mod csr;
mod dense;
pub use csc::*;
pub use csr::*;
pub use dense::*;

mod sparsevector;
pub use sparsevector::SparseVector;

mod sparse_or_dense;
pub use sparse_or_dense::{ActiveStorage, SparseOrDenseMatrix};

mod ops;

#[cfg(test)]
mod tests;
