#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;
use std::sync::Arc;

impl<T: FloatT> MatrixVectorMultiply for DenseMatrix<T> {
    type T = T;

    // implements y = a*A*x + b*y
    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let (m, n) = self.size;
        assert!(n == x.len() && m == y.len());

        if b == T::zero() {
            y.fill(T::zero());
        } else {
            y.scale(b);
        }
        if a == T::zero() {
            return;
        }
        for (col, &xc) in x.iter().enumerate() {
            let axc = a * xc;
            if axc == T::zero() {
                continue;
            }
            for (yr, &Aij) in zip(y.iter_mut(), self.col_slice(col)) {
                *yr += Aij * axc;
            }
        }
    }

    // implements y = a*A'*x + b*y
    fn gemtv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let (m, n) = self.size;
        assert!(m == x.len() && n == y.len());

        for (col, yc) in y.iter_mut().enumerate() {
            let v = a * self.col_slice(col).dot(x);
            *yc = if b == T::zero() { v } else { v + b * *yc };
        }
    }
}

impl<T> DenseMatrix<T>
where
    T: FloatT,
{
    /// In place product `self = self * other` for any right factor.
    ///
    /// Fails with `ShapesDoNotMatch` if `other` does not have
    /// `self.ncols()` rows.
    pub fn rightmultiply<M>(&mut self, other: &M) -> Result<(), MatrixError>
    where
        M: MatrixInterface<T> + ?Sized,
    {
        let (m, k) = self.size;
        if other.rows() != k {
            return Err(MatrixError::shapes(format!(
                "cannot rightmultiply {}x{} by {}x{}",
                m,
                k,
                other.rows(),
                other.cols()
            )));
        }
        let n = other.cols();
        let mut data = vec![T::zero(); m * n];
        let mut bcol = vec![T::zero(); k];
        for (j, out) in data.chunks_mut(m.max(1)).take(n).enumerate() {
            for (i, b) in bcol.iter_mut().enumerate() {
                *b = other.get_entry(i, j);
            }
            self.gemv(out, &bcol, T::one(), T::zero());
        }
        self.size = (m, n);
        self.data = Arc::new(data);
        Ok(())
    }

    /// `self += alpha * x`
    pub fn axpy(&mut self, alpha: T, x: &DenseMatrix<T>) -> Result<(), MatrixError> {
        if self.size != x.size {
            return Err(MatrixError::shapes(format!(
                "{}x{} and {}x{}",
                self.nrows(),
                self.ncols(),
                x.nrows(),
                x.ncols()
            )));
        }
        // x may share the buffer with self
        let xdata = Arc::clone(&x.data);
        self.data_mut().axpby(alpha, &xdata, T::one());
        Ok(())
    }
}

#[test]
fn test_dense_gemv() {
    let A = DenseMatrix::from(&[
        [1., 2., 3.], //
        [4., 5., 6.],
    ]);
    let mut y = vec![1., 1.];
    A.gemv(&mut y, &[1., 0., -1.], 2., 1.);
    assert_eq!(y, vec![-3., -3.]);

    let mut z = vec![0.; 3];
    A.mtv(&[1., 1.], &mut z);
    assert_eq!(z, vec![5., 7., 9.]);
}

#[test]
fn test_dense_rightmultiply() {
    let mut A = DenseMatrix::from(&[
        [1., 2.], //
        [3., 4.],
    ]);
    let B = DenseMatrix::from(&[
        [0., 1., 1.], //
        [1., 0., 2.],
    ]);
    A.rightmultiply(&B).unwrap();
    assert_eq!(A.size, (2, 3));
    assert_eq!(A.get_entry(0, 2), 5.);
    assert_eq!(A.get_entry(1, 0), 4.);
    assert!(A.rightmultiply(&B).is_err());

    let I = DenseMatrix::<f64>::identity(3);
    let before = A.clone();
    A.axpy(-1., &before).unwrap();
    assert_eq!(A.sup_norm(), 0.);
    A.rightmultiply(&I).unwrap();
    assert_eq!(A.size, (2, 3));
}
