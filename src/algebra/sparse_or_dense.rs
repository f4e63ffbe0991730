use crate::algebra::compressed::validated_rows;
use crate::algebra::*;
use crate::settings::MatrixSettings;
use enum_dispatch::*;
use log::debug;

/// Storage chosen by a [`SparseOrDenseMatrix`] at construction
#[enum_dispatch(MatrixInterface<T>)]
#[derive(Debug, Clone)]
pub enum ActiveStorage<T>
where
    T: FloatT,
{
    CsrMatrix(CsrMatrix<T>),
    CscMatrix(CscMatrix<T>),
    DenseMatrix(DenseMatrix<T>),
}

/// Matrix that picks sparse or dense storage once, from the density
/// observed at construction.
///
/// A matrix is stored sparse (in the requested [`SparseFormat`]) when the
/// fraction of structural cells is below `settings.sparse_limit` (0.1 by
/// default), and dense otherwise.  The decision is never revisited, so the
/// density of a matrix may drift arbitrarily far from the threshold through
/// later writes.
///
/// ```
/// use sparsela::algebra::*;
/// use sparsela::settings::MatrixSettings;
///
/// let settings = MatrixSettings::<f64>::default();
/// let pattern = SparsityPattern::diagonal(20);
/// let A = SparseOrDenseMatrix::new(20, 20, &pattern, SparseFormat::Csr, &settings).unwrap();
/// assert!(A.is_sparse());
///
/// let B = SparseOrDenseMatrix::filled(4, 4, 1.0, SparseFormat::Csr, &settings);
/// assert!(!B.is_sparse());
/// ```
#[derive(Debug, Clone)]
pub struct SparseOrDenseMatrix<T>
where
    T: FloatT,
{
    storage: ActiveStorage<T>,
    format: SparseFormat,
    settings: MatrixSettings<T>,
}

impl<T> SparseOrDenseMatrix<T>
where
    T: FloatT,
{
    /// Zero matrix over `pattern`.  The density is the number of distinct
    /// cells in `pattern` over `rows*cols`.
    pub fn new(
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
        format: SparseFormat,
        settings: &MatrixSettings<T>,
    ) -> Result<Self, MatrixError> {
        let nnz = if rows == 0 || cols == 0 {
            0
        } else {
            validated_rows(rows, cols, pattern)?
                .iter()
                .map(|r| r.len())
                .sum()
        };
        let storage = if is_sparse_density(nnz, rows, cols, settings) {
            match format {
                SparseFormat::Csr => CsrMatrix::with_settings(rows, cols, pattern, settings)?.into(),
                SparseFormat::Csc => CscMatrix::with_settings(rows, cols, pattern, settings)?.into(),
            }
        } else {
            DenseMatrix::zeros((rows, cols)).into()
        };
        Ok(Self::from_parts(storage, format, settings))
    }

    /// `rows x cols` matrix with every entry equal to `value`.
    ///
    /// A numerically zero `value` gives a sparse matrix with an empty
    /// pattern if `settings.use_sparse_if_zero` is set, and a dense zero
    /// matrix otherwise.  Any other value gives a dense matrix.
    pub fn filled(
        rows: usize,
        cols: usize,
        value: T,
        format: SparseFormat,
        settings: &MatrixSettings<T>,
    ) -> Self {
        let n = match format {
            SparseFormat::Csr => rows,
            SparseFormat::Csc => cols,
        };
        let is_zero = !is_nonzero(value, relative_tolerance(settings.eps, n));
        let (eps, nlocks) = (settings.eps, settings.num_mutexes);
        let storage = if is_zero && settings.use_sparse_if_zero {
            match format {
                SparseFormat::Csr => CsrMatrix::filled_with_eps(rows, cols, value, nlocks, eps).into(),
                SparseFormat::Csc => CscMatrix::filled_with_eps(rows, cols, value, nlocks, eps).into(),
            }
        } else if is_zero {
            DenseMatrix::zeros((rows, cols)).into()
        } else {
            DenseMatrix::filled((rows, cols), value).into()
        };
        Self::from_parts(storage, format, settings)
    }

    /// Converts any matrix.  The density counts cells with
    /// `|v| > eps / other.cols()`.  With `prune`, a sparse result drops
    /// the cells below that tolerance.
    pub fn from_matrix<M>(
        other: &M,
        prune: bool,
        format: SparseFormat,
        settings: &MatrixSettings<T>,
    ) -> Self
    where
        M: MatrixInterface<T> + ?Sized,
    {
        let (rows, cols) = other.size();
        let tol = relative_tolerance(settings.eps, cols);
        let mut nnz = 0;
        for r in 0..rows {
            for c in 0..cols {
                if is_nonzero(other.get_entry(r, c), tol) {
                    nnz += 1;
                }
            }
        }
        let (eps, nlocks) = (settings.eps, settings.num_mutexes);
        let storage = if is_sparse_density(nnz, rows, cols, settings) {
            match format {
                SparseFormat::Csr => CsrMatrix::from_matrix(other, prune, eps, nlocks).into(),
                SparseFormat::Csc => CscMatrix::from_matrix(other, prune, eps, nlocks).into(),
            }
        } else {
            DenseMatrix::from_matrix(other).into()
        };
        Self::from_parts(storage, format, settings)
    }

    fn from_parts(
        storage: ActiveStorage<T>,
        format: SparseFormat,
        settings: &MatrixSettings<T>,
    ) -> Self {
        let out = Self {
            storage,
            format,
            settings: settings.clone(),
        };
        debug!(
            "{}x{} adaptive matrix stored {}",
            out.rows(),
            out.cols(),
            if out.is_sparse() { "sparse" } else { "dense" }
        );
        out
    }

    /// True if the active storage is CSR or CSC
    pub fn is_sparse(&self) -> bool {
        !matches!(self.storage, ActiveStorage::DenseMatrix(_))
    }

    /// The active storage
    pub fn storage(&self) -> &ActiveStorage<T> {
        &self.storage
    }

    /// Sparse format used when the storage is sparse
    pub fn format(&self) -> SparseFormat {
        self.format
    }

    /// Settings the matrix was built with
    pub fn settings(&self) -> &MatrixSettings<T> {
        &self.settings
    }

    /// Shares the buffers of the active storage with `self` (same as `clone`)
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy with private buffers.  The storage kind and settings are kept.
    pub fn deep_copy(&self) -> Self {
        let storage = match &self.storage {
            ActiveStorage::CsrMatrix(A) => ActiveStorage::CsrMatrix(A.deep_copy()),
            ActiveStorage::CscMatrix(A) => ActiveStorage::CscMatrix(A.deep_copy()),
            ActiveStorage::DenseMatrix(A) => ActiveStorage::DenseMatrix(A.deep_copy()),
        };
        Self {
            storage,
            format: self.format,
            settings: self.settings.clone(),
        }
    }

    /// True if the active storage currently shares its buffers
    pub fn is_shared(&self) -> bool {
        match &self.storage {
            ActiveStorage::CsrMatrix(A) => A.is_shared(),
            ActiveStorage::CscMatrix(A) => A.is_shared(),
            ActiveStorage::DenseMatrix(A) => A.is_shared(),
        }
    }

    /// In place product `self = self * other`, computed by the active
    /// storage.  The storage kind is kept.
    pub fn rightmultiply<M>(&mut self, other: &M) -> Result<(), MatrixError>
    where
        M: MatrixInterface<T> + ?Sized,
    {
        match &mut self.storage {
            ActiveStorage::CsrMatrix(A) => A.rightmultiply(other),
            ActiveStorage::CscMatrix(A) => A.rightmultiply(other),
            ActiveStorage::DenseMatrix(A) => A.rightmultiply(other),
        }
    }

    /// `self += alpha * x`.
    ///
    /// Operands with the same storage kind use the whole-buffer update.
    /// Otherwise every stored cell of `x` must be structural in `self`.
    pub fn axpy(&mut self, alpha: T, x: &SparseOrDenseMatrix<T>) -> Result<(), MatrixError> {
        match (&mut self.storage, &x.storage) {
            (ActiveStorage::CsrMatrix(A), ActiveStorage::CsrMatrix(X)) => A.axpy(alpha, X),
            (ActiveStorage::CscMatrix(A), ActiveStorage::CscMatrix(X)) => A.axpy(alpha, X),
            (ActiveStorage::DenseMatrix(A), ActiveStorage::DenseMatrix(X)) => A.axpy(alpha, X),
            (A, X) => {
                if A.size() != X.size() {
                    return Err(MatrixError::shapes("axpy operands differ in size"));
                }
                let pattern = X.pattern(false, T::zero());
                if !pattern.is_subset_of(&A.pattern(false, T::zero())) {
                    return Err(MatrixError::shapes(
                        "axpy operand has entries outside the pattern",
                    ));
                }
                for (r, row) in pattern.iter().enumerate() {
                    for &c in row {
                        A.add_to_entry(r, c, alpha * X.get_entry(r, c))?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn is_sparse_density<T: FloatT>(
    nnz: usize,
    rows: usize,
    cols: usize,
    settings: &MatrixSettings<T>,
) -> bool {
    let ncells = rows * cols;
    ncells == 0 || (nnz as f64) / (ncells as f64) < settings.sparse_limit
}

impl<T> MatrixInterface<T> for SparseOrDenseMatrix<T>
where
    T: FloatT,
{
    fn rows(&self) -> usize {
        self.storage.rows()
    }
    fn cols(&self) -> usize {
        self.storage.cols()
    }
    fn get_entry(&self, row: usize, col: usize) -> T {
        self.storage.get_entry(row, col)
    }
    fn set_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        self.storage.set_entry(row, col, value)
    }
    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        self.storage.add_to_entry(row, col, value)
    }
    fn clear_row(&mut self, row: usize) {
        self.storage.clear_row(row)
    }
    fn clear_col(&mut self, col: usize) {
        self.storage.clear_col(col)
    }
    fn unit_row(&mut self, row: usize) -> Result<(), MatrixError> {
        self.storage.unit_row(row)
    }
    fn unit_col(&mut self, col: usize) -> Result<(), MatrixError> {
        self.storage.unit_col(col)
    }
    fn mv(&self, x: &[T], y: &mut [T]) {
        self.storage.mv(x, y)
    }
    fn mtv(&self, x: &[T], y: &mut [T]) {
        self.storage.mtv(x, y)
    }
    fn scal(&mut self, alpha: T) {
        self.storage.scal(alpha)
    }
    fn valid(&self) -> bool {
        self.storage.valid()
    }
    fn non_zeros(&self) -> usize {
        self.storage.non_zeros()
    }
    fn pattern(&self, prune: bool, eps: T) -> SparsityPattern {
        self.storage.pattern(prune, eps)
    }
    fn sup_norm(&self) -> T {
        self.storage.sup_norm()
    }
}

impl<T> MatrixAlgebra<T> for SparseOrDenseMatrix<T>
where
    T: FloatT,
{
    fn allocate_like(
        &self,
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
    ) -> Result<Self, MatrixError> {
        Self::new(rows, cols, pattern, self.format, &self.settings)
    }
}

impl<T: FloatT> std::fmt::Display for SparseOrDenseMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_matrix(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_decision() {
        let settings = MatrixSettings::<f64>::default();

        // 9 of 100 cells, below the limit
        let mut pattern = SparsityPattern::diagonal(10);
        pattern.inner_mut(9).clear();
        let A = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csc, &settings).unwrap();
        assert!(A.is_sparse());
        assert!(matches!(A.storage(), ActiveStorage::CscMatrix(_)));

        // 10 of 100 cells is not below the limit
        let pattern = SparsityPattern::diagonal(10);
        let B = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csc, &settings).unwrap();
        assert!(!B.is_sparse());
        assert_eq!(B.non_zeros(), 100);

        // duplicates in the pattern are counted once
        let mut pattern = SparsityPattern::new(10);
        for _ in 0..20 {
            pattern.insert(0, 0);
        }
        let C = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csr, &settings).unwrap();
        assert!(C.is_sparse());

        assert!(SparseOrDenseMatrix::new(9, 10, &pattern, SparseFormat::Csr, &settings).is_err());
    }

    #[test]
    fn test_filled_zero() {
        let settings = MatrixSettings::<f64>::default();
        let A = SparseOrDenseMatrix::filled(3, 3, 0.0, SparseFormat::Csr, &settings);
        assert!(A.is_sparse());
        assert_eq!(A.non_zeros(), 0);

        let mut settings = settings;
        settings.use_sparse_if_zero = false;
        let B = SparseOrDenseMatrix::filled(3, 3, 0.0, SparseFormat::Csr, &settings);
        assert!(!B.is_sparse());
        assert_eq!(B.get_entry(2, 2), 0.0);
    }

    #[test]
    fn test_decision_is_frozen() {
        let settings = MatrixSettings::<f64>::default();
        let mut A =
            SparseOrDenseMatrix::filled(4, 4, 0.0, SparseFormat::Csr, &settings);
        assert!(A.is_sparse());
        // nothing is structural, and writing does not change the storage kind
        assert!(A.set_entry(0, 0, 1.0).is_err());
        assert!(A.is_sparse());

        let mut B = SparseOrDenseMatrix::filled(4, 4, 0.0, SparseFormat::Csr, &{
            let mut s = settings.clone();
            s.use_sparse_if_zero = false;
            s
        });
        B.set_entry(0, 0, 1.0).unwrap();
        B.scal(0.0);
        assert!(!B.is_sparse());
    }

    #[test]
    fn test_from_matrix_and_axpy() {
        let settings = MatrixSettings::<f64>::default();
        let mut D = DenseMatrix::<f64>::zeros((20, 20));
        for i in 0..20 {
            D[(i, i)] = (i + 1) as f64;
        }
        let A = SparseOrDenseMatrix::from_matrix(&D, true, SparseFormat::Csr, &settings);
        assert!(A.is_sparse());
        assert_eq!(A.non_zeros(), 20);

        let mut B = A.clone();
        B.axpy(2.0, &A).unwrap();
        assert_eq!(B.get_entry(3, 3), 12.0);
        assert_eq!(A.get_entry(3, 3), 4.0);

        // mixed kinds go through the generic path
        let E = SparseOrDenseMatrix::from_matrix(&D, true, SparseFormat::Csr, &{
            let mut s = settings.clone();
            s.sparse_limit = 0.01;
            s
        });
        assert!(!E.is_sparse());
        let mut F = E.clone();
        F.axpy(-1.0, &A).unwrap();
        assert_eq!(F.sup_norm(), 0.0);
        let mut G = A.clone();
        assert!(G.axpy(1.0, &E).is_err());
    }

    #[test]
    fn test_rightmultiply_keeps_storage() {
        let settings = MatrixSettings::<f64>::default();
        let pattern = SparsityPattern::diagonal(20);
        let mut A =
            SparseOrDenseMatrix::new(20, 20, &pattern, SparseFormat::Csc, &settings).unwrap();
        for i in 0..20 {
            A.set_entry(i, i, 2.0).unwrap();
        }
        let I = DenseMatrix::<f64>::identity(20);
        A.rightmultiply(&I).unwrap();
        assert!(A.is_sparse());
        assert_eq!(A.get_entry(5, 5), 2.0);
        assert_eq!(A.non_zeros(), 20);
    }

    #[test]
    fn test_copy_on_write() {
        let settings = MatrixSettings::<f64>::default();
        let mut pattern = SparsityPattern::diagonal(10);
        pattern.inner_mut(9).clear();
        let S = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csr, &settings).unwrap();
        let D = SparseOrDenseMatrix::filled(10, 10, 0.5, SparseFormat::Csr, &settings);
        assert!(S.is_sparse() && !D.is_sparse());

        for A in [S, D] {
            let mut B = A.copy();
            assert!(A.is_shared() && B.is_shared());

            B.set_entry(3, 3, 5.0).unwrap();
            assert!(!A.is_shared() && !B.is_shared());
            assert_eq!(B.is_sparse(), A.is_sparse());
            assert_ne!(A.get_entry(3, 3), 5.0);
            assert_eq!(B.get_entry(3, 3), 5.0);
        }
    }

    #[test]
    fn test_deep_copy() {
        let mut settings = MatrixSettings::<f64>::default();
        settings.num_mutexes = 3;
        let mut pattern = SparsityPattern::diagonal(10);
        pattern.inner_mut(9).clear();
        let A = SparseOrDenseMatrix::new(10, 10, &pattern, SparseFormat::Csc, &settings).unwrap();
        let B = A.deep_copy();
        assert!(!A.is_shared() && !B.is_shared());
        assert!(matches!(B.storage(), ActiveStorage::CscMatrix(_)));
        assert_eq!(B.format(), SparseFormat::Csc);
        assert_eq!(B.settings().num_mutexes, 3);
        assert!(B.almost_equal(&A, 0.0).unwrap());

        let D = SparseOrDenseMatrix::filled(4, 4, 2.0, SparseFormat::Csr, &settings);
        let E = D.deep_copy();
        assert!(!E.is_sparse() && !D.is_shared());
        assert_eq!(E.format(), SparseFormat::Csr);
        assert_eq!(E.get_entry(1, 2), 2.0);
    }

}
