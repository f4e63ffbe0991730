use crate::algebra::compressed::CompressedStorage;
use crate::algebra::sparsevector::sparse_dot;
use crate::algebra::*;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }

    fn gemtv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self, y, x, a, b);
    }
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `A*x` for a sparse `x`.  Only the columns selected by the stored
    /// entries of `x` are visited, accumulating into a dense temporary.
    pub fn mv_sparse(&self, x: &SparseVector<T>) -> SparseVector<T> {
        assert_eq!(x.n, self.ncols());
        let s = &self.storage;
        let mut y = vec![T::zero(); self.nrows()];
        for (&c, &xc) in std::iter::zip(&x.nzind, &x.nzval) {
            for k in s.range(c) {
                y[s.indices()[k]] += s.entries()[k] * xc;
            }
        }
        SparseVector::new(&y)
    }

    /// `A^T*x` for a sparse `x`.  Each column is merged against the stored
    /// indices of `x`.
    pub fn mtv_sparse(&self, x: &SparseVector<T>) -> SparseVector<T> {
        assert_eq!(x.n, self.nrows());
        let s = &self.storage;
        let mut y = SparseVector::zeros(self.ncols());
        for c in 0..self.ncols() {
            let rng = s.range(c);
            let v = sparse_dot(&s.indices()[rng.clone()], &s.entries()[rng], x);
            if v != T::zero() {
                y.nzind.push(c);
                y.nzval.push(v);
            }
        }
        y
    }

    /// In place product `self = self * other` for any right factor, built
    /// one result column at a time.
    ///
    /// Products with `|v| <= eps / other.cols()` are dropped from the new
    /// pattern.  Fails with `ShapesDoNotMatch` if `other` does not have
    /// `self.ncols()` rows.
    pub fn rightmultiply<M>(&mut self, other: &M) -> Result<(), MatrixError>
    where
        M: MatrixInterface<T> + ?Sized,
    {
        if other.rows() != self.ncols() {
            return Err(MatrixError::shapes(format!(
                "cannot rightmultiply {}x{} by {}x{}",
                self.nrows(),
                self.ncols(),
                other.rows(),
                other.cols()
            )));
        }
        let ncols = other.cols();
        let tol = relative_tolerance(self.eps(), ncols);
        let (colptr, rowval, nzval) =
            self.storage
                .colwise_product_parts(ncols, |k, j| other.get_entry(k, j), tol);
        let m = self.nrows();
        self.storage.replace_with(ncols, m, colptr, rowval, nzval)
    }

    /// In place product `self = self * other` with a CSC right factor.
    /// Only stored entries of both factors are visited.
    pub fn rightmultiply_sparse(&mut self, other: &CscMatrix<T>) -> Result<(), MatrixError> {
        let ncols = other.ncols();
        let tol = relative_tolerance(self.eps(), ncols);
        // (A*B)^T = B^T*A^T, and the CSC arrays of a matrix are the CSR
        // arrays of its transpose
        let (colptr, rowval, nzval) =
            CompressedStorage::product_parts(&other.storage, &self.storage, tol)?;
        let m = self.nrows();
        self.storage.replace_with(ncols, m, colptr, rowval, nzval)
    }

    /// `self += alpha * x`.  Both matrices must have the same pattern.
    pub fn axpy(&mut self, alpha: T, x: &CscMatrix<T>) -> Result<(), MatrixError> {
        self.storage.axpy(alpha, &x.storage)
    }
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.ncols());
    assert_eq!(y.len(), A.nrows());

    let colptr = A.column_offsets();
    let rowval = A.row_indices();
    let nzval = A.entries();

    //y += A*x
    if a == T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in colptr[j]..colptr[j + 1] {
                y[rowval[i]] += nzval[i] * *xj;
            }
        }
    } else if a == -T::one() {
        for (j, xj) in x.iter().enumerate() {
            for i in colptr[j]..colptr[j + 1] {
                y[rowval[i]] -= nzval[i] * *xj;
            }
        }
    } else {
        for (j, xj) in x.iter().enumerate() {
            for i in colptr[j]..colptr[j + 1] {
                y[rowval[i]] += a * nzval[i] * *xj;
            }
        }
    }
}

// sparse matrix-vector multiply, transposed
#[allow(non_snake_case)]
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //first do the b*y part
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.nrows());
    assert_eq!(y.len(), A.ncols());

    let colptr = A.column_offsets();
    let rowval = A.row_indices();
    let nzval = A.entries();

    //y += A^T*x
    if a == T::one() {
        for (j, yj) in y.iter_mut().enumerate() {
            for k in colptr[j]..colptr[j + 1] {
                *yj += nzval[k] * x[rowval[k]];
            }
        }
    } else if a == -T::one() {
        for (j, yj) in y.iter_mut().enumerate() {
            for k in colptr[j]..colptr[j + 1] {
                *yj -= nzval[k] * x[rowval[k]];
            }
        }
    } else {
        for (j, yj) in y.iter_mut().enumerate() {
            for k in colptr[j]..colptr[j + 1] {
                *yj += a * nzval[k] * x[rowval[k]];
            }
        }
    }
}
