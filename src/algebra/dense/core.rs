#![allow(non_snake_case)]

use crate::algebra::*;
use log::debug;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

/// Dense matrix in column major format
///
/// The data buffer is shared between clones and made private on the first
/// write, as for the compressed formats.  Every cell is structural, so
/// `set_entry` only fails for out of bounds indices.
///
/// ```
/// use sparsela::algebra::*;
///
/// let A = DenseMatrix::from(&[
///     [1., 2.],
///     [3., 4.],
/// ]);
/// assert_eq!(A[(1, 0)], 3.);
/// assert_eq!(A.data(), &[1., 3., 2., 4.]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T = f64> {
    /// dimensions
    pub(crate) size: (usize, usize),
    /// vector of data in column major format
    pub(crate) data: Arc<Vec<T>>,
}

impl<T> DenseMatrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        Self::filled(size, T::zero())
    }

    pub fn filled(size: (usize, usize), value: T) -> Self {
        let (m, n) = size;
        Self {
            size,
            data: Arc::new(vec![value; m * n]),
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = DenseMatrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// `m x n` matrix from column major data
    ///
    /// # Panics
    /// Panics if `src` does not have `m*n` elements.
    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            size,
            data: Arc::new(src.to_vec()),
        }
    }

    /// Dense copy of any matrix
    pub fn from_matrix<M>(other: &M) -> Self
    where
        M: MatrixInterface<T> + ?Sized,
    {
        let (m, n) = other.size();
        let mut out = DenseMatrix::zeros((m, n));
        let data = out.data_mut();
        for c in 0..n {
            for r in 0..m {
                data[r + m * c] = other.get_entry(r, c);
            }
        }
        out
    }

    pub fn nrows(&self) -> usize {
        self.size.0
    }

    pub fn ncols(&self) -> usize {
        self.size.1
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable data.  Makes the buffer private first.
    pub fn data_mut(&mut self) -> &mut [T] {
        if Arc::strong_count(&self.data) > 1 {
            debug!(
                "copy-on-write split of {}x{} dense buffer",
                self.size.0, self.size.1
            );
        }
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// True if the buffer is currently shared with another matrix
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.data) > 1
    }

    /// Copy with a private buffer
    pub fn deep_copy(&self) -> Self {
        Self {
            size: self.size,
            data: Arc::new(self.data.to_vec()),
        }
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        let m = self.nrows();
        assert!(col < self.ncols());
        &self.data[(col * m)..(col + 1) * m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        let m = self.nrows();
        assert!(col < self.ncols());
        &mut self.data_mut()[(col * m)..(col + 1) * m]
    }

    #[inline]
    pub(crate) fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.nrows() * idx.1
    }

    #[inline]
    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.nrows() && col < self.ncols()
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T>
where
    T: FloatT,
{
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        assert!(self.in_bounds(idx.0, idx.1));
        let lidx = self.index_linear(idx);
        &mut self.data_mut()[lidx]
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        assert!(self.in_bounds(idx.0, idx.1));
        &self.data[self.index_linear(idx)]
    }
}

// Matrix from a row major array of rows
impl<'a, I, J, T> From<I> for DenseMatrix<T>
where
    I: IntoIterator<Item = J>,
    J: IntoIterator<Item = &'a T>,
    T: FloatT,
{
    fn from(rows: I) -> DenseMatrix<T> {
        let rows: Vec<Vec<T>> = rows
            .into_iter()
            .map(|r| r.into_iter().copied().collect())
            .collect();

        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        assert!(rows.iter().all(|r| r.len() == n), "ragged rows");

        let mut data = Vec::with_capacity(m * n);
        for c in 0..n {
            data.extend(rows.iter().map(|r| r[c]));
        }
        DenseMatrix {
            size: (m, n),
            data: Arc::new(data),
        }
    }
}

impl<T> MatrixInterface<T> for DenseMatrix<T>
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
        self[(row, col)]
    }

    fn set_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if !self.in_bounds(row, col) {
            return Err(MatrixError::IndexOutOfRange { row, col });
        }
        self[(row, col)] = value;
        Ok(())
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        if !self.in_bounds(row, col) {
            return Err(MatrixError::IndexOutOfRange { row, col });
        }
        self[(row, col)] += value;
        Ok(())
    }

    fn clear_row(&mut self, row: usize) {
        assert!(row < self.nrows());
        let m = self.nrows();
        let data = self.data_mut();
        for v in data.iter_mut().skip(row).step_by(m) {
            *v = T::zero();
        }
    }

    fn clear_col(&mut self, col: usize) {
        self.col_slice_mut(col).set(T::zero());
    }

    fn mv(&self, x: &[T], y: &mut [T]) {
        self.gemv(y, x, T::one(), T::zero());
    }

    fn mtv(&self, x: &[T], y: &mut [T]) {
        self.gemtv(y, x, T::one(), T::zero());
    }

    fn scal(&mut self, alpha: T) {
        self.data_mut().scale(alpha);
    }

    fn valid(&self) -> bool {
        self.data.is_finite()
    }

    fn sup_norm(&self) -> T {
        self.data.norm_inf()
    }
}

impl<T> MatrixAlgebra<T> for DenseMatrix<T>
where
    T: FloatT,
{
    // every cell of a dense matrix is structural, so the pattern only
    // has to fit the dimensions
    fn allocate_like(
        &self,
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
    ) -> Result<Self, MatrixError> {
        if rows > 0 && cols > 0 {
            crate::algebra::compressed::validated_rows(rows, cols, pattern)?;
        }
        Ok(DenseMatrix::zeros((rows, cols)))
    }
}

impl<T> std::fmt::Display for DenseMatrix<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_matrix(self, f)
    }
}

#[test]
fn test_dense_from_rows() {
    let A = DenseMatrix::from(&[
        [1., 2., 3.], //
        [4., 5., 6.],
    ]);
    assert_eq!(A.size, (2, 3));
    assert_eq!(A.data(), &[1., 4., 2., 5., 3., 6.]);
    assert_eq!(A.col_slice(2), &[3., 6.]);
    assert_eq!(A.get_entry(1, 2), 6.);
}

#[test]
fn test_dense_cow_and_clear() {
    let A = DenseMatrix::<f64>::filled((2, 2), 3.);
    let mut B = A.clone();
    assert!(A.is_shared());
    B.clear_row(1);
    assert!(!A.is_shared());
    assert_eq!(A.get_entry(1, 0), 3.);
    assert_eq!(B.data(), &[3., 0., 3., 0.]);
    B.clear_col(0);
    assert_eq!(B.data(), &[0., 0., 3., 0.]);
    assert!(B.set_entry(2, 0, 1.).is_err());
    B.unit_row(1).unwrap();
    assert_eq!(B.data(), &[0., 0., 3., 1.]);
}
