#![allow(non_snake_case)]

use crate::algebra::compressed::{transpose_lists, validated_rows, CompressedStorage, SparseFormat};
use crate::algebra::*;
use crate::settings::MatrixSettings;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// Storage is shared between clones and split on first write, exactly as
/// for [`CsrMatrix`](crate::algebra::CsrMatrix).  Stripe locks are still
/// selected by row, so concurrent updates through the
/// [`assembler`](CscMatrix::assembler) are serialized per row.
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```
/// use sparsela::algebra::*;
///
/// let A : CscMatrix<f64> = CscMatrix::from_raw_parts(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  ).unwrap();
///
/// assert_eq!(A.get_entry(2, 1), 4.);
/// assert_eq!(A.get_entry(2, 0), 0.);
///
/// ```
///

#[derive(Debug)]
pub struct CscMatrix<T = f64> {
    pub(crate) storage: CompressedStorage<T>,
}

impl<T: FloatT> Clone for CscMatrix<T> {
    fn clone(&self) -> Self {
        CscMatrix {
            storage: self.storage.clone(),
        }
    }
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor over a (row-wise) sparsity pattern, with all
    /// entries zero.
    ///
    /// Fails with `ShapesDoNotMatch` if the pattern does not have `m` rows
    /// or refers to a column `>= n`.  If either dimension is zero the
    /// pattern is ignored.
    pub fn new(
        m: usize,
        n: usize,
        pattern: &SparsityPattern,
        num_mutexes: usize,
    ) -> Result<Self, MatrixError> {
        Self::build(m, n, pattern, num_mutexes, default_eps())
    }

    /// As [`new`](CscMatrix::new), taking lock count and tolerance from `settings`
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
                n,
                m,
                num_mutexes,
                eps,
            )));
        }
        let rows = validated_rows(m, n, pattern)?;
        let cols = transpose_lists(&rows, n);
        Ok(Self::from_storage(CompressedStorage::from_lists(
            n,
            m,
            &cols,
            num_mutexes,
            eps,
        )))
    }

    pub(crate) fn from_storage(storage: CompressedStorage<T>) -> Self {
        CscMatrix { storage }
    }

    /// `m x n` matrix with every entry equal to `value`.
    ///
    /// If `value` is numerically zero (`|value| <= eps / n`) the result has
    /// an empty pattern, otherwise every cell is structural.
    pub fn filled(m: usize, n: usize, value: T, num_mutexes: usize) -> Self {
        Self::filled_with_eps(m, n, value, num_mutexes, default_eps())
    }

    pub(crate) fn filled_with_eps(m: usize, n: usize, value: T, num_mutexes: usize, eps: T) -> Self {
        let storage = if m == 0 || n == 0 || !is_nonzero(value, relative_tolerance(eps, n)) {
            CompressedStorage::empty(n, m, num_mutexes, eps)
        } else {
            CompressedStorage::full(n, m, value, num_mutexes, eps)
        };
        Self::from_storage(storage)
    }

    /// `m x n` matrix with an empty pattern
    pub fn zeros(m: usize, n: usize) -> Self {
        Self::from_storage(CompressedStorage::empty(n, m, 1, default_eps()))
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];
        Self::from_storage(CompressedStorage::from_parts_unchecked(
            n,
            n,
            colptr,
            rowval,
            nzval,
            1,
            default_eps(),
        ))
    }

    /// Converts any matrix by scanning all of its cells column by column.
    ///
    /// With `prune`, cells with `|v| <= eps / other.cols()` are dropped.
    /// Otherwise every cell is kept, including exact zeros.
    pub fn from_matrix<M>(other: &M, prune: bool, eps: T, num_mutexes: usize) -> Self
    where
        M: MatrixInterface<T> + ?Sized,
    {
        let (m, n) = other.size();
        let tol = relative_tolerance(eps, n);
        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for c in 0..n {
            for r in 0..m {
                let v = other.get_entry(r, c);
                if !prune || is_nonzero(v, tol) {
                    rowval.push(r);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        Self::from_storage(CompressedStorage::from_parts_unchecked(
            n,
            m,
            colptr,
            rowval,
            nzval,
            num_mutexes,
            eps,
        ))
    }

    /// `CscMatrix` from raw compressed arrays, validated with
    /// [`check_format`](CscMatrix::check_format).
    pub fn from_raw_parts(
        m: usize,
        n: usize,
        colptr: Vec<usize>,
        rowval: Vec<usize>,
        nzval: Vec<T>,
    ) -> Result<Self, MatrixError> {
        let storage =
            CompressedStorage::from_parts(n, m, colptr, rowval, nzval, 1, default_eps())?;
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
            self.ncols(),
            self.nrows(),
            self.num_mutexes(),
            self.storage.eps,
        );
        self.storage.replace(next);
    }

    /// number of rows
    pub fn nrows(&self) -> usize {
        self.storage.ninner
    }

    /// number of columns
    pub fn ncols(&self) -> usize {
        self.storage.nouter
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.storage.nnz()
    }

    /// stored values, column by column
    pub fn entries(&self) -> &[T] {
        self.storage.entries()
    }

    /// Mutable stored values.  Makes the buffers private first.
    pub fn entries_mut(&mut self) -> &mut [T] {
        self.storage.entries_mut()
    }

    /// CSC format column pointer, of length `n+1`
    pub fn column_offsets(&self) -> &[usize] {
        self.storage.offsets()
    }

    /// row index of each stored value
    pub fn row_indices(&self) -> &[usize] {
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
        self.storage.assembler(SparseFormat::Csc)
    }

    /// Same matrix in CSR format
    pub fn to_csr(&self) -> CsrMatrix<T> {
        CsrMatrix::from_storage(self.storage.transpose())
    }

    /// Dense copy
    pub fn to_dense(&self) -> DenseMatrix<T> {
        let mut out = DenseMatrix::zeros((self.nrows(), self.ncols()));
        for c in 0..self.ncols() {
            for k in self.storage.range(c) {
                out[(self.storage.indices()[k], c)] = self.storage.entries()[k];
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

impl<T> MatrixInterface<T> for CscMatrix<T>
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
        self.storage.get(col, row)
    }

    fn set_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if self.storage.set(col, row, value) {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange { row, col })
        }
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if self.storage.add(col, row, row, value) {
            Ok(())
        } else {
            Err(MatrixError::IndexOutOfRange { row, col })
        }
    }

    fn clear_row(&mut self, row: usize) {
        self.storage.clear_inner(row);
    }

    fn clear_col(&mut self, col: usize) {
        self.storage.clear_outer(col);
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
        let cols = self.storage.outer_lists(prune, tol);
        SparsityPattern::from(transpose_lists(&cols, self.nrows()))
    }

    fn sup_norm(&self) -> T {
        self.storage.sup_norm()
    }
}

impl<T> MatrixAlgebra<T> for CscMatrix<T>
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

impl<T: FloatT> std::fmt::Display for CscMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_matrix(self, f)
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::from_raw_parts(
        6,                                                                 // m
        5,                                                                 // n
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    )
    .unwrap();

    assert_eq!(A.get_entry(1, 0), 1.);
    assert_eq!(A.get_entry(5, 0), 3.);
    assert_eq!(A.get_entry(0, 1), 4.);
    assert_eq!(A.get_entry(3, 1), 7.);
    assert_eq!(A.get_entry(5, 1), 9.);
    assert_eq!(A.get_entry(3, 2), 10.);
    assert_eq!(A.get_entry(4, 2), 11.);
    assert_eq!(A.get_entry(4, 4), 14.);

    assert_eq!(A.get_entry(0, 0), 0.);
    assert_eq!(A.get_entry(4, 0), 0.);
    assert_eq!(A.get_entry(2, 2), 0.);
    assert_eq!(A.get_entry(1, 3), 0.);
    assert_eq!(A.get_entry(2, 3), 0.);
    assert_eq!(A.get_entry(4, 3), 0.);
    assert_eq!(A.get_entry(3, 4), 0.);

    // structural entries only
    assert!(A.clone().set_entry(0, 0, 1.).is_err());
    assert_eq!(A.pattern(false, 0.).inner(3), &[0, 1, 2]);
}

#[test]
fn test_csc_construction() {
    let mut pattern = SparsityPattern::new(2);
    pattern.insert(0, 2);
    pattern.insert(1, 0);
    pattern.insert(0, 0);

    let A = CscMatrix::<f64>::new(2, 3, &pattern, 2).unwrap();
    assert_eq!(A.column_offsets(), &[0, 2, 2, 3]);
    assert_eq!(A.row_indices(), &[0, 1, 0]);
    assert_eq!(A.num_mutexes(), 2);
    assert_eq!(A.pattern(false, 0.), pattern);

    assert!(CscMatrix::<f64>::new(3, 3, &pattern, 1).is_err());
    assert!(CscMatrix::<f64>::new(2, 2, &pattern, 1).is_err());

    // zero test of filled() is relative to the column count
    assert_eq!(CscMatrix::<f64>::filled(2, 3, 1e-19, 1).nnz(), 0);
    assert_eq!(CscMatrix::<f64>::filled(2, 3, 1e-3, 1).nnz(), 6);
}

#[test]
fn test_csc_unit_col_and_row() {
    let mut A = CscMatrix::<f64>::filled(3, 3, 2.0, 1);
    A.unit_col(1).unwrap();
    assert_eq!(A.get_entry(0, 1), 0.);
    assert_eq!(A.get_entry(1, 1), 1.);
    assert_eq!(A.get_entry(1, 0), 2.);
    A.unit_row(2).unwrap();
    assert_eq!(A.get_entry(2, 0), 0.);
    assert_eq!(A.get_entry(2, 2), 1.);

    let mut B = CscMatrix::<f64>::zeros(2, 2);
    assert!(B.unit_row(0).is_err());
}
