use crate::algebra::compressed::CompressedStorage;
use crate::algebra::sparsevector::sparse_dot;
use crate::algebra::*;

impl<T: FloatT> MatrixVectorMultiply for CsrMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csr_axpby_N(self, y, x, a, b);
    }

    fn gemtv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csr_axpby_T(self, y, x, a, b);
    }
}

impl<T> CsrMatrix<T>
where
    T: FloatT,
{
    /// `A*x` for a sparse `x`.  Each row is merged against the stored
    /// indices of `x`, so zero entries of `x` are never visited.
    pub fn mv_sparse(&self, x: &SparseVector<T>) -> SparseVector<T> {
        assert_eq!(x.n, self.ncols());
        let s = &self.storage;
        let mut y = SparseVector::zeros(self.nrows());
        for r in 0..self.nrows() {
            let rng = s.range(r);
            let v = sparse_dot(&s.indices()[rng.clone()], &s.entries()[rng], x);
            if v != T::zero() {
                y.nzind.push(r);
                y.nzval.push(v);
            }
        }
        y
    }

    /// `A^T*x` for a sparse `x`.  Only the rows selected by the stored
    /// entries of `x` are visited.
    pub fn mtv_sparse(&self, x: &SparseVector<T>) -> SparseVector<T> {
        assert_eq!(x.n, self.nrows());
        let s = &self.storage;
        let mut y = vec![T::zero(); self.ncols()];
        for (&r, &xr) in std::iter::zip(&x.nzind, &x.nzval) {
            for k in s.range(r) {
                y[s.indices()[k]] += s.entries()[k] * xr;
            }
        }
        SparseVector::new(&y)
    }

    /// In place product `self = self * other` for any right factor.
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
        let (offsets, indices, entries) =
            self.storage
                .rowwise_product_parts(ncols, |k, j| other.get_entry(k, j), tol);
        let m = self.nrows();
        self.storage.replace_with(m, ncols, offsets, indices, entries)
    }

    /// In place product `self = self * other` with a CSR right factor.
    /// Only stored entries of both factors are visited.
    pub fn rightmultiply_sparse(&mut self, other: &CsrMatrix<T>) -> Result<(), MatrixError> {
        let ncols = other.ncols();
        let tol = relative_tolerance(self.eps(), ncols);
        let (offsets, indices, entries) =
            CompressedStorage::product_parts(&self.storage, &other.storage, tol)?;
        let m = self.nrows();
        self.storage.replace_with(m, ncols, offsets, indices, entries)
    }

    /// `self += alpha * x`.  Both matrices must have the same pattern.
    pub fn axpy(&mut self, alpha: T, x: &CsrMatrix<T>) -> Result<(), MatrixError> {
        self.storage.axpy(alpha, &x.storage)
    }
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csr_axpby_N<T: FloatT>(A: &CsrMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
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

    let rowptr = A.row_offsets();
    let colval = A.column_indices();
    let nzval = A.entries();

    //y += A*x, one row at a time
    for (i, yi) in y.iter_mut().enumerate() {
        let mut acc = T::zero();
        for k in rowptr[i]..rowptr[i + 1] {
            acc += nzval[k] * x[colval[k]];
        }
        *yi += a * acc;
    }
}

// sparse matrix-vector multiply, transposed
#[allow(non_snake_case)]
fn _csr_axpby_T<T: FloatT>(A: &CsrMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
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

    let rowptr = A.row_offsets();
    let colval = A.column_indices();
    let nzval = A.entries();

    //y += A^T*x
    if a == T::one() {
        for (i, xi) in x.iter().enumerate() {
            for k in rowptr[i]..rowptr[i + 1] {
                y[colval[k]] += nzval[k] * *xi;
            }
        }
    } else if a == -T::one() {
        for (i, xi) in x.iter().enumerate() {
            for k in rowptr[i]..rowptr[i + 1] {
                y[colval[k]] -= nzval[k] * *xi;
            }
        }
    } else {
        for (i, xi) in x.iter().enumerate() {
            for k in rowptr[i]..rowptr[i + 1] {
                y[colval[k]] += a * nzval[k] * *xi;
            }
        }
    }
}
