#![allow(non_snake_case)]

use crate::algebra::compressed::{validated_rows, CompressedStorage, SparseFormat};
use crate::algebra::*;
use crate::settings::MatrixSettings;

/// Sparse matrix in Compressed Sparse Row (CSR) format
///
/// The entry, offset and index arrays are held behind a reference-counted
/// handle.  Cloning a `CsrMatrix` shares them, and the first mutation of a
/// shared matrix makes a private copy before writing.  Each matrix also owns
/// a fixed set of stripe locks used by [`add_to_entry`](MatrixInterface::add_to_entry)
/// and by the concurrent [`assembler`](CsrMatrix::assembler).
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  .]
///     [.  2.   .]
///     [.  .   4.]
/// ```
///
/// ```
/// use sparsela::algebra::*;
///
/// let mut pattern = SparsityPattern::new(3);
/// pattern.insert(0, 0);
/// pattern.insert(0, 1);
/// pattern.insert(1, 1);
/// pattern.insert(2, 2);
///
/// let mut A = CsrMatrix::<f64>::new(3, 3, &pattern, 1).unwrap();
/// A.set_entry(0, 0, 1.).unwrap();
/// A.set_entry(0, 1, 3.).unwrap();
/// A.set_entry(1, 1, 2.).unwrap();
/// A.set_entry(2, 2, 4.).unwrap();
///
/// assert_eq!(A.row_offsets(), &[0, 2, 3, 4]);
/// assert_eq!(A.column_indices(), &[0, 1, 1, 2]);
/// assert_eq!(A.get_entry(1, 0), 0.);
/// assert!(A.set_entry(1, 0, 1.).is_err());
/// ```
///

#[derive(Debug)]
pub struct CsrMatrix<T = f64> {
    pub(crate) storage: CompressedStorage<T>,
}

impl<T: FloatT> Clone for CsrMatrix<T> {
    fn clone(&self) -> Self {
        CsrMatrix {
            storage: self.storage.clone(),
        }
    }
}

impl<T> CsrMatrix<T>
where
    T: FloatT,
{
    /// `CsrMatrix` constructor over a sparsity pattern, with all entries zero.
    ///
    /// Fails with `ShapesDoNotMatch` if the pattern does not have `m` rows
    /// or refers to a column `>= n`.  The pattern rows need not be sorted.
    /// If either dimension is zero the pattern is ignored.
    pub fn new(
        m: usize,
        n: usize,
        pattern: &SparsityPattern,
        num_mutexes: usize,
    ) -> Result<Self, MatrixError> {
        Self::build(m, n, pattern, num_mutexes, default_eps())
    }

    /// As [`new`](CsrMatrix::new), taking lock count and tolerance from `settings`
    pub fn with_settings(
        m: usize,
        n: usize,
        pattern: &SparsityPattern,
        settings: &MatrixSettings<T>,
    ) -> Result<Self, MatrixError> {
        Self::build(m, n, pattern, settings.num_mutexes, settings.eps)
    }

    pub(crate) fn build(
        m: usize,
        n: usize,
        pattern: &SparsityPattern,
        num_mutexes: usize,
        eps: T,
    ) -> Result<Self, MatrixError> {
        if m == 0 || n == 0 {
            return Ok(Self::from_storage(CompressedStorage::empty(
                m,
                n,
                num_mutexes,
                eps,
            )));
        }
        let rows = validated_rows(m, n, pattern)?;
        Ok(Self::from_storage(CompressedStorage::from_lists(
            m,
            n,
            &rows,
            num_mutexes,
            eps,
        )))
    }

    pub(crate) fn from_storage(storage: CompressedStorage<T>) -> Self {
        CsrMatrix { storage }
    }

    /// `m x n` matrix with every entry equal to `value`.
    ///
    /// If `value` is numerically zero (`|value| <= eps / m`) the result has
    /// an empty pattern, otherwise every cell is structural.
    pub fn filled(m: usize, n: usize, value: T, num_mutexes: usize) -> Self {
        Self::filled_with_eps(m, n, value, num_mutexes, default_eps())
    }

    pub(crate) fn filled_with_eps(m: usize, n: usize, value: T, num_mutexes: usize, eps: T) -> Self {
        let storage = if m == 0 || n == 0 || !is_nonzero(value, relative_tolerance(eps, m)) {
            CompressedStorage::empty(m, n, num_mutexes, eps)
        } else {
            CompressedStorage::full(m, n, value, num_mutexes, eps)
        };
        Self::from_storage(storage)
    }

    /// `m x n` matrix with an empty pattern
    pub fn zeros(m: usize, n: usize) -> Self {
        Self::from_storage(CompressedStorage::empty(m, n, 1, default_eps()))
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let offsets = (0usize..=n).collect();
        let indices = (0usize..n).collect();
        let entries = vec![T::one(); n];
        Self::from_storage(CompressedStorage::from_parts_unchecked(
            n,
            n,
            offsets,
            indices,
            entries,
            1,
            default_eps(),
        ))
    }

    /// Converts any matrix by scanning all of its cells.
    ///
    /// With `prune`, cells with `|v| <= eps / other.cols()` are dropped.
    /// Otherwise every cell is kept, including exact zeros.
    pub fn from_matrix<M>(other: &M, prune: bool, eps: T, num_mutexes: usize) -> Self
    where
        M: MatrixInterface<T> + ?Sized,
    {
        let (m, n) = other.size();
        let tol = relative_tolerance(eps, n);
        let mut offsets = Vec::with_capacity(m + 1);
        let mut indices = Vec::new();
        let mut entries = Vec::new();
        offsets.push(0);
        for r in 0..m {
            for c in 0..n {
                let v = other.get_entry(r, c);
                if !prune || is_nonzero(v, tol) {
                    indices.push(c);
                    entries.push(v);
                }
            }
            offsets.push(indices.len());
        }
        Self::from_storage(CompressedStorage::from_parts_unchecked(
            m,
            n,
            offsets,
            indices,
            entries,
            num_mutexes,
            eps,
        ))
    }

    /// `CsrMatrix` from raw compressed arrays, validated with
    /// [`check_format`](CsrMatrix::check_format).
    pub fn from_raw_parts(
        m: usize,
        n: usize,
        row_offsets: Vec<usize>,
        column_indices: Vec<usize>,
        entries: Vec<T>,
    ) -> Result<Self, MatrixError> {
        let storage = CompressedStorage::from_parts(
            m,
            n,
            row_offsets,
            column_indices,
            entries,
            1,
            default_eps(),
        )?;
        Ok(Self::from_storage(storage))
    }

    /// Shares the buffers with `self` (same as `clone`)
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy with private buffers and a fresh set of stripe locks
    pub fn deep_copy(&self) -> Self {
        Self::from_storage(self.storage.deep_copy())
    }

    /// Replaces `self` with a private copy of `other`, keeping the
    /// lock count and tolerance of `self`.
    pub fn deep_copy_from(&mut self, other: &Self) {
        let next = other
            .storage
            .private_copy(self.num_mutexes(), self.storage.eps);
        self.storage.replace(next);
    }

    /// Removes every structural entry, keeping the dimensions
    pub fn clear(&mut self) {
        let next = CompressedStorage::empty(
            self.nrows(),
            self.ncols(),
            self.num_mutexes(),
            self.storage.eps,
        );
        self.storage.replace(next);
    }

    /// number of rows
    pub fn nrows(&self) -> usize {
        self.storage.nouter
    }

    /// number of columns
    pub fn ncols(&self) -> usize {
        self.storage.ninner
    }

    /// number of stored entries
    pub fn nnz(&self) -> usize {
        self.storage.nnz()
    }

    /// stored values, row by row
    pub fn entries(&self) -> &[T] {
        self.storage.entries()
    }

    /// Mutable stored values.  Makes the buffers private first.
    pub fn entries_mut(&mut self) -> &mut [T] {
        self.storage.entries_mut()
    }

    /// CSR row offsets, of length `m+1`
    pub fn row_offsets(&self) -> &[usize] {
        self.storage.offsets()
    }

    /// column index of each stored value
    pub fn column_indices(&self) -> &[usize] {
        self.storage.indices()
    }

    /// relative tolerance used for zero detection
    pub fn eps(&self) -> T {
        self.storage.eps
    }

    /// number of stripe locks
    pub fn num_mutexes(&self) -> usize {
        self.storage.num_mutexes()
    }

    /// True if the buffers are currently shared with another matrix
    pub fn is_shared(&self) -> bool {
        self.storage.is_shared()
    }

    /// Future clones of `self` take a private copy instead of sharing
    pub fn mark_unshareable(&mut self) {
        self.storage.mark_unshareable();
    }

    /// True if `self` and `other` currently share their buffers
    pub fn shares_buffers_with(&self, other: &Self) -> bool {
        self.storage.shares_buffers_with(&other.storage)
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        self.storage.check_format()
    }

    /// Concurrent accumulation view.  Makes the buffers private once, up front.
    pub fn assembler(&mut self) -> StripedAssembler<'_, T> {
        self.storage.assembler(SparseFormat::Csr)
    }

    /// Same matrix in CSC format
    pub fn to_csc(&self) -> CscMatrix<T> {
        CscMatrix::from_storage(self.storage.transpose())
    }

    /// Dense copy
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut out = DenseMatrix::zeros((self.nrows(), self.ncols()));
        for r in 0..self.nrows() {
            for k in self.storage.range(r) {
                out[(r, self.storage.indices()[k])] = self.storage.entries()[k];
            }
        }
        out
    }

    pub(crate) fn check_index(&self, row: usize, col: usize) {
        assert!(
            row < self.nrows() && col < self.ncols(),
            "index ({}, {}) out of bounds for a {}x{} matrix",
            row,
            col,
            self.nrows(),
            self.ncols()
        );
    }
}

impl<T> MatrixInterface<T> for CsrMatrix<T>
where
    T: FloatT,
{
    fn rows(&self) -> usize {
        self.nrows()
    }

    fn cols(&self) -> usize {
        self.ncols()
    }

    fn get_entry(&self, row: usize, col: usize) -> T {
        self.check_index(row, col);
        self.storage.get(row, col)
    }

    fn set_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if self.storage.set(row, col, value) {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange { row, col })
        }
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if self.storage.add(row, col, row, value) {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange { row, col })
        }
    }

    fn clear_row(&mut self, row: usize) {
        self.storage.clear_outer(row);
    }

    fn clear_col(&mut self, col: usize) {
        self.storage.clear_inner(col);
    }

    fn unit_row(&mut self, row: usize) -> Result<(), MatrixError> {
        if self.storage.locate(row, row).is_none() {
            return Err(MatrixError::IndexOutOfRange { row, col: row });
        }
        self.clear_row(row);
        self.set_entry(row, row, T::one())
    }

    fn unit_col(&mut self, col: usize) -> Result<(), MatrixError> {
        if self.storage.locate(col, col).is_none() {
            return Err(MatrixError::IndexOutOfRange { row: col, col });
        }
        self.clear_col(col);
        self.set_entry(col, col, T::one())
    }

    fn mv(&self, x: &[T], y: &mut [T]) {
        self.gemv(y, x, T::one(), T::zero());
    }

    fn mtv(&self, x: &[T], y: &mut [T]) {
        self.gemtv(y, x, T::one(), T::zero());
    }

    fn scal(&mut self, alpha: T) {
        self.storage.scale(alpha);
    }

    fn valid(&self) -> bool {
        self.storage.is_valid()
    }

    fn non_zeros(&self) -> usize {
        self.nnz()
    }

    fn pattern(&self, prune: bool, eps: T) -> SparsityPattern {
        let tol = relative_tolerance(eps, self.ncols());
        SparsityPattern::from(self.storage.outer_lists(prune, tol))
    }

    fn sup_norm(&self) -> T {
        self.storage.sup_norm()
    }
}

impl<T> MatrixAlgebra<T> for CsrMatrix<T>
where
    T: FloatT,
{
    fn allocate_like(
        &self,
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
    ) -> Result<Self, MatrixError> {
        Self::build(rows, cols, pattern, self.num_mutexes(), self.eps())
    }
}

impl<T: FloatT> std::fmt::Display for CsrMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_matrix(self, f)
    }
}

#[test]
fn test_csr_construction() {
    let mut pattern = SparsityPattern::new(3);
    pattern.insert(0, 1);
    pattern.insert(0, 0);
    pattern.insert(0, 1);
    pattern.insert(2, 2);

    let A = CsrMatrix::<f64>::new(3, 3, &pattern, 0).unwrap();
    assert_eq!(A.row_offsets(), &[0, 2, 2, 3]);
    assert_eq!(A.column_indices(), &[0, 1, 2]);
    assert_eq!(A.entries(), &[0., 0., 0.]);
    assert_eq!(A.num_mutexes(), 1);
    assert!(A.check_format().is_ok());

    // wrong row count, column out of bounds
    assert!(matches!(
        CsrMatrix::<f64>::new(2, 3, &pattern, 1),
        Err(MatrixError::ShapesDoNotMatch(_))
    ));
    assert!(matches!(
        CsrMatrix::<f64>::new(3, 2, &pattern, 1),
        Err(MatrixError::ShapesDoNotMatch(_))
    ));

    // zero dimension ignores the pattern
    let Z = CsrMatrix::<f64>::new(3, 0, &pattern, 1).unwrap();
    assert_eq!(Z.nnz(), 0);
    assert_eq!(Z.row_offsets(), &[0, 0, 0, 0]);
}

#[test]
fn test_csr_filled_and_from_matrix() {
    let Z = CsrMatrix::<f64>::filled(2, 3, 1e-20, 1);
    assert_eq!(Z.nnz(), 0);
    let F = CsrMatrix::<f64>::filled(2, 3, 2.0, 1);
    assert_eq!(F.nnz(), 6);
    assert_eq!(F.get_entry(1, 2), 2.0);

    let D = DenseMatrix::from(&[
        [1., 0., 1e-19],
        [0., 5., 0.],
    ]);
    let P = CsrMatrix::from_matrix(&D, true, 1e-18, 1);
    assert_eq!(P.nnz(), 2);
    assert_eq!(P.column_indices(), &[0, 1]);
    let U = CsrMatrix::from_matrix(&D, false, 1e-18, 1);
    assert_eq!(U.nnz(), 6);
    assert_eq!(U.get_entry(0, 2), 1e-19);
}

#[test]
fn test_csr_from_raw_parts() {
    let A = CsrMatrix::from_raw_parts(2, 2, vec![0, 1, 2], vec![1, 0], vec![3., 4.]).unwrap();
    assert_eq!(A.get_entry(0, 1), 3.);
    assert_eq!(A.get_entry(1, 0), 4.);
    assert_eq!(A.get_entry(0, 0), 0.);
    assert!(CsrMatrix::from_raw_parts(2, 2, vec![0, 1, 3], vec![1, 0], vec![3., 4.]).is_err());
}

#[test]
#[should_panic]
fn test_csr_get_entry_out_of_bounds() {
    let A = CsrMatrix::<f64>::zeros(2, 2);
    A.get_entry(2, 0);
}
