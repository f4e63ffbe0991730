use crate::algebra::{is_nonzero, relative_tolerance, FloatT, MatrixError, SparsityPattern};
use enum_dispatch::enum_dispatch;
use std::fmt;

/// Primitive element and product operations shared by every matrix container.
///
/// This is the minimal surface that backends implement.  Everything in
/// [`MatrixAlgebra`] is built from these methods only, so it works over
/// any conforming storage, including mixed-format operands.
#[enum_dispatch]
pub trait MatrixInterface<T>
where
    T: FloatT,
{
    /// number of rows
    fn rows(&self) -> usize;

    /// number of columns
    fn cols(&self) -> usize;

    /// `(rows, cols)`
    fn size(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Value at `(row, col)`.  Cells outside the sparsity pattern read as zero.
    ///
    /// # Panics
    /// Panics if `(row, col)` is out of bounds.
    fn get_entry(&self, row: usize, col: usize) -> T;

    /// Overwrites a structural entry.  Fails with `IndexOutOfRange` if
    /// `(row, col)` is not part of the pattern.
    fn set_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError>;

    /// Adds to a structural entry.  Fails with `IndexOutOfRange` if
    /// `(row, col)` is not part of the pattern.
    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), MatrixError>;

    /// Zeroes all structural entries of `row`
    fn clear_row(&mut self, row: usize);

    /// Zeroes all structural entries of `col`
    fn clear_col(&mut self, col: usize);

    /// Clears `row` and sets its diagonal entry to one
    fn unit_row(&mut self, row: usize) -> Result<(), MatrixError> {
        self.clear_row(row);
        self.set_entry(row, row, T::one())
    }

    /// Clears `col` and sets its diagonal entry to one
    fn unit_col(&mut self, col: usize) -> Result<(), MatrixError> {
        self.clear_col(col);
        self.set_entry(col, col, T::one())
    }

    /// `y = A*x`
    fn mv(&self, x: &[T], y: &mut [T]);

    /// `y = A^T*x`
    fn mtv(&self, x: &[T], y: &mut [T]);

    /// `A = alpha*A`
    fn scal(&mut self, alpha: T);

    /// False if any stored entry is NaN or infinite
    fn valid(&self) -> bool;

    /// Number of stored entries, including explicit zeros
    fn non_zeros(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Pattern of the stored entries.  With `prune`, entries with
    /// `|v| <= eps / cols` are left out.
    fn pattern(&self, prune: bool, eps: T) -> SparsityPattern {
        let tol = relative_tolerance(eps, self.cols());
        let mut pattern = SparsityPattern::new(self.rows());
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                if !prune || is_nonzero(self.get_entry(r, c), tol) {
                    pattern.insert(r, c);
                }
            }
        }
        pattern
    }

    /// Largest entry in absolute value
    fn sup_norm(&self) -> T {
        let mut out = T::zero();
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                out = T::max(out, T::abs(self.get_entry(r, c)));
            }
        }
        out
    }
}

/// Backend-agnostic algebra over [`MatrixInterface`].
///
/// Implementors only provide [`allocate_like`](MatrixAlgebra::allocate_like).
/// Results are allocated over a pattern computed from the operands and are
/// then filled through `get_entry`, `set_entry` and `add_to_entry`.  Right
/// operands may be any [`MatrixInterface`], so mixed CSR, CSC and dense
/// arithmetic is supported.
pub trait MatrixAlgebra<T>: MatrixInterface<T> + Sized
where
    T: FloatT,
{
    /// A zero matrix of the same kind and settings as `self`, with the
    /// given dimensions and sparsity pattern.
    fn allocate_like(
        &self,
        rows: usize,
        cols: usize,
        pattern: &SparsityPattern,
    ) -> Result<Self, MatrixError>;

    /// `self * other` over the symbolic product pattern.  Not sparsity
    /// aware in its inner loop; concrete types provide `rightmultiply`.
    fn multiply<M: MatrixInterface<T>>(&self, other: &M) -> Result<Self, MatrixError> {
        if self.cols() != other.rows() {
            return Err(MatrixError::shapes(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows(),
                self.cols(),
                other.rows(),
                other.cols()
            )));
        }
        let zero = T::zero();
        let pattern = self
            .pattern(false, zero)
            .product(&other.pattern(false, zero))?;
        let mut out = self.allocate_like(self.rows(), other.cols(), &pattern)?;
        for r in 0..self.rows() {
            for k in 0..self.cols() {
                let a = self.get_entry(r, k);
                if a == zero {
                    continue;
                }
                for &c in pattern.inner(r) {
                    let b = other.get_entry(k, c);
                    if b != zero {
                        out.add_to_entry(r, c, a * b)?;
                    }
                }
            }
        }
        Ok(out)
    }

    /// `self + other` over the union of both patterns
    fn add<M: MatrixInterface<T>>(&self, other: &M) -> Result<Self, MatrixError> {
        combine_over_union(self, other, T::one())
    }

    /// `self - other` over the union of both patterns
    fn subtract<M: MatrixInterface<T>>(&self, other: &M) -> Result<Self, MatrixError> {
        combine_over_union(self, other, -T::one())
    }

    /// `self += other`.  The pattern of `other` must be contained in
    /// the pattern of `self`.
    fn add_assign<M: MatrixInterface<T>>(&mut self, other: &M) -> Result<(), MatrixError> {
        accumulate_within_pattern(self, other, T::one())
    }

    /// `self -= other`.  The pattern of `other` must be contained in
    /// the pattern of `self`.
    fn subtract_assign<M: MatrixInterface<T>>(&mut self, other: &M) -> Result<(), MatrixError> {
        accumulate_within_pattern(self, other, -T::one())
    }

    /// `cols x rows` transpose over the transposed pattern
    fn transposed(&self) -> Result<Self, MatrixError> {
        let pattern = self.pattern(false, T::zero());
        let tpattern = pattern.transposed(self.cols());
        let mut out = self.allocate_like(self.cols(), self.rows(), &tpattern)?;
        for (r, row) in pattern.iter().enumerate() {
            for &c in row {
                out.set_entry(c, r, self.get_entry(r, c))?;
            }
        }
        Ok(out)
    }

    /// Copy without the entries satisfying `|v| <= eps / cols`
    fn pruned(&self, eps: T) -> Result<Self, MatrixError> {
        let pattern = self.pattern(true, eps);
        let mut out = self.allocate_like(self.rows(), self.cols(), &pattern)?;
        for (r, row) in pattern.iter().enumerate() {
            for &c in row {
                out.set_entry(r, c, self.get_entry(r, c))?;
            }
        }
        Ok(out)
    }

    /// True if all entries in the union of both patterns agree to within `eps`.
    /// A NaN on either side never agrees.
    fn almost_equal<M: MatrixInterface<T>>(&self, other: &M, eps: T) -> Result<bool, MatrixError> {
        check_same_size(self, other)?;
        let zero = T::zero();
        let union = self
            .pattern(false, zero)
            .union(&other.pattern(false, zero))?;
        for (r, row) in union.iter().enumerate() {
            for &c in row {
                if !(T::abs(self.get_entry(r, c) - other.get_entry(r, c)) <= eps) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

fn check_same_size<T, A, B>(a: &A, b: &B) -> Result<(), MatrixError>
where
    T: FloatT,
    A: MatrixInterface<T> + ?Sized,
    B: MatrixInterface<T> + ?Sized,
{
    if a.size() != b.size() {
        return Err(MatrixError::shapes(format!(
            "{}x{} and {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    Ok(())
}

fn combine_over_union<T, A, B>(a: &A, b: &B, sign: T) -> Result<A, MatrixError>
where
    T: FloatT,
    A: MatrixAlgebra<T>,
    B: MatrixInterface<T>,
{
    check_same_size(a, b)?;
    let zero = T::zero();
    let union = a.pattern(false, zero).union(&b.pattern(false, zero))?;
    let mut out = a.allocate_like(a.rows(), a.cols(), &union)?;
    for (r, row) in union.iter().enumerate() {
        for &c in row {
            out.set_entry(r, c, a.get_entry(r, c) + sign * b.get_entry(r, c))?;
        }
    }
    Ok(out)
}

fn accumulate_within_pattern<T, A, B>(a: &mut A, b: &B, sign: T) -> Result<(), MatrixError>
where
    T: FloatT,
    A: MatrixAlgebra<T>,
    B: MatrixInterface<T>,
{
    check_same_size(a, b)?;
    let zero = T::zero();
    let bpattern = b.pattern(false, zero);
    if !bpattern.is_subset_of(&a.pattern(false, zero)) {
        return Err(MatrixError::shapes(
            "the right operand has entries outside the pattern of the left operand",
        ));
    }
    for (r, row) in bpattern.iter().enumerate() {
        for &c in row {
            a.add_to_entry(r, c, sign * b.get_entry(r, c))?;
        }
    }
    Ok(())
}

/// Writes a matrix as `[[a b],\n [c d]]`.
pub(crate) fn fmt_matrix<T, M>(m: &M, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: FloatT,
    M: MatrixInterface<T> + ?Sized,
{
    let (rows, cols) = m.size();
    if rows == 0 || cols == 0 {
        return write!(f, "[[ ]]");
    }
    write!(f, "[")?;
    for r in 0..rows {
        if r > 0 {
            write!(f, "\n ")?;
        }
        write!(f, "[{}", m.get_entry(r, 0))?;
        for c in 1..cols {
            write!(f, " {}", m.get_entry(r, c))?;
        }
        write!(f, "]")?;
        if r + 1 < rows {
            write!(f, ",")?;
        }
    }
    write!(f, "]")
}
