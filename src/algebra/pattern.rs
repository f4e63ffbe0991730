use crate::algebra::MatrixError;
use itertools::Itertools;
use std::ops::Add;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sparsity pattern stored as one list of column indices per row.
///
/// A pattern declares which `(row, col)` cells are structurally present
/// before a compressed container is allocated against it.
///
/// __Normalization policy__: [`insert`](SparsityPattern::insert) is lazy and
/// neither sorts nor removes duplicates.  Call [`sort`](SparsityPattern::sort)
/// to normalize explicitly.  Every consumer in this crate that relies on sorted
/// unique indices (compressed matrix constructors, [`union`](SparsityPattern::union),
/// [`is_subset_of`](SparsityPattern::is_subset_of), equality) normalizes its own
/// view of each row, so an unsorted pattern is never a correctness hazard.
///
/// ```
/// use sparsela::algebra::SparsityPattern;
///
/// let mut pattern = SparsityPattern::new(2);
/// pattern.insert(0, 1);
/// pattern.insert(0, 0);
/// pattern.insert(1, 1);
/// pattern.sort();
/// assert_eq!(pattern.inner(0), &[0, 1]);
/// ```
#[derive(Debug, Clone, Default, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparsityPattern {
    rows: Vec<Vec<usize>>,
}

impl SparsityPattern {
    /// Pattern with `size` empty rows
    pub fn new(size: usize) -> Self {
        Self {
            rows: vec![Vec::new(); size],
        }
    }

    /// Pattern with every cell of a `rows x cols` matrix present
    pub fn dense(rows: usize, cols: usize) -> Self {
        let row: Vec<usize> = (0..cols).collect();
        Self {
            rows: vec![row; rows],
        }
    }

    /// Diagonal pattern of size `n`
    pub fn diagonal(n: usize) -> Self {
        Self {
            rows: (0..n).map(|i| vec![i]).collect(),
        }
    }

    /// number of rows
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// total number of stored indices, including duplicates if not normalized
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(|r| r.len()).sum()
    }

    /// Column indices of `row`
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    pub fn inner(&self, row: usize) -> &[usize] {
        &self.rows[row]
    }

    /// Mutable access to the column indices of `row`
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    pub fn inner_mut(&mut self, row: usize) -> &mut Vec<usize> {
        &mut self.rows[row]
    }

    /// Iterator over the rows of the pattern
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<usize>> {
        self.rows.iter()
    }

    /// Appends `col` to the indices of `row`.  Does not sort or deduplicate.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    pub fn insert(&mut self, row: usize, col: usize) {
        self.rows[row].push(col);
    }

    /// Sorts the indices of a single row ascending and removes duplicates
    pub fn sort_row(&mut self, row: usize) {
        let r = &mut self.rows[row];
        r.sort_unstable();
        r.dedup();
    }

    /// Sorts every row ascending and removes duplicates
    pub fn sort(&mut self) {
        for r in self.rows.iter_mut() {
            r.sort_unstable();
            r.dedup();
        }
    }

    /// True if every row is strictly increasing
    pub fn is_normalized(&self) -> bool {
        self.rows
            .iter()
            .all(|r| r.windows(2).all(|w| w[0] < w[1]))
    }

    /// True if `(row, col)` is structurally present.  Works on unsorted rows.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows.get(row).is_some_and(|r| r.contains(&col))
    }

    /// Row-wise set union of two patterns.  The result is normalized.
    pub fn union(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.size() != other.size() {
            return Err(MatrixError::shapes(format!(
                "pattern sizes {} and {} differ",
                self.size(),
                other.size()
            )));
        }
        let rows = self
            .rows
            .iter()
            .zip(&other.rows)
            .map(|(a, b)| {
                let (a, b) = (normalized(a), normalized(b));
                itertools::merge(a.iter().copied(), b.iter().copied())
                    .dedup()
                    .collect()
            })
            .collect();
        Ok(Self { rows })
    }

    /// True if every cell of `self` is also present in `other`
    pub fn is_subset_of(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }
        self.rows.iter().zip(&other.rows).all(|(a, b)| {
            let b = normalized(b);
            normalized(a).iter().all(|c| b.binary_search(c).is_ok())
        })
    }

    /// Pattern of the transposed matrix, for a pattern of a matrix with `cols` columns.
    /// The result is normalized.
    ///
    /// # Panics
    /// Panics if any column index is `>= cols`.
    pub fn transposed(&self, cols: usize) -> Self {
        let mut out = SparsityPattern::new(cols);
        for (row, cols_in_row) in self.rows.iter().enumerate() {
            for &col in cols_in_row.iter().unique() {
                out.rows[col].push(row);
            }
        }
        //rows were visited in order, so only duplicates can be out of place
        out.sort();
        out
    }

    /// Symbolic product of `self` (an `m x k` pattern) with `other` (a `k x n` pattern).
    pub fn product(&self, other: &Self) -> Result<Self, MatrixError> {
        let mut out = SparsityPattern::new(self.size());
        for (row, inner) in self.rows.iter().enumerate() {
            let mut cols = Vec::new();
            for &k in inner {
                let brow = other.rows.get(k).ok_or_else(|| {
                    MatrixError::shapes(format!(
                        "inner index {} exceeds the {} rows of the right factor",
                        k,
                        other.size()
                    ))
                })?;
                cols.extend_from_slice(brow);
            }
            cols.sort_unstable();
            cols.dedup();
            out.rows[row] = cols;
        }
        Ok(out)
    }
}

// sorted and deduplicated copy of a row, borrowed when already normalized
fn normalized(row: &[usize]) -> std::borrow::Cow<'_, [usize]> {
    if row.windows(2).all(|w| w[0] < w[1]) {
        std::borrow::Cow::Borrowed(row)
    } else {
        let mut v = row.to_vec();
        v.sort_unstable();
        v.dedup();
        std::borrow::Cow::Owned(v)
    }
}

impl PartialEq for SparsityPattern {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size()
            && self
                .rows
                .iter()
                .zip(&other.rows)
                .all(|(a, b)| normalized(a) == normalized(b))
    }
}

impl<'a> IntoIterator for &'a SparsityPattern {
    type Item = &'a Vec<usize>;
    type IntoIter = std::slice::Iter<'a, Vec<usize>>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pattern union.
///
/// # Panics
/// Panics if the patterns have a different number of rows.
impl Add for &SparsityPattern {
    type Output = SparsityPattern;
    fn add(self, other: &SparsityPattern) -> SparsityPattern {
        match self.union(other) {
            Ok(p) => p,
            Err(e) => panic!("{}", e),
        }
    }
}

impl From<Vec<Vec<usize>>> for SparsityPattern {
    fn from(rows: Vec<Vec<usize>>) -> Self {
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pattern() -> SparsityPattern {
        // [x x . .]
        // [. x . .]
        // [. . x x]
        SparsityPattern::from(vec![vec![1, 0], vec![1], vec![3, 2, 3]])
    }

    #[test]
    fn test_insert_is_lazy() {
        let mut p = SparsityPattern::new(2);
        p.insert(0, 3);
        p.insert(0, 1);
        p.insert(0, 3);
        assert_eq!(p.inner(0), &[3, 1, 3]);
        assert!(!p.is_normalized());
        p.sort_row(0);
        assert_eq!(p.inner(0), &[1, 3]);
        assert!(p.is_normalized());
    }

    #[test]
    fn test_structural_equality() {
        let mut a = test_pattern();
        let b = test_pattern();
        assert_eq!(a, b);
        a.sort();
        assert_eq!(a, b);
        a.insert(1, 0);
        assert_ne!(a, b);
        assert_ne!(SparsityPattern::new(2), SparsityPattern::new(3));
    }

    #[test]
    fn test_union_and_subset() {
        let a = test_pattern();
        let mut b = SparsityPattern::new(3);
        b.insert(0, 2);
        b.insert(2, 2);
        let u = a.union(&b).unwrap();
        assert_eq!(u.inner(0), &[0, 1, 2]);
        assert_eq!(u.inner(1), &[1]);
        assert_eq!(u.inner(2), &[2, 3]);
        assert!(a.is_subset_of(&u));
        assert!(b.is_subset_of(&u));
        assert!(!u.is_subset_of(&a));
        assert_eq!(&a + &b, u);

        assert!(a.union(&SparsityPattern::new(2)).is_err());
    }

    #[test]
    fn test_transposed_and_product() {
        let a = test_pattern();
        let t = a.transposed(4);
        assert_eq!(t.size(), 4);
        assert_eq!(t.inner(0), &[0]);
        assert_eq!(t.inner(1), &[0, 1]);
        assert_eq!(t.inner(3), &[2]);

        // (3x4) * (4x3)
        let p = a.product(&t).unwrap();
        assert_eq!(p.inner(0), &[0, 1]);
        assert_eq!(p.inner(1), &[0, 1]);
        assert_eq!(p.inner(2), &[2]);

        assert!(a.product(&SparsityPattern::new(2)).is_err());
    }

    #[test]
    fn test_contains_dense_diagonal() {
        let a = test_pattern();
        assert!(a.contains(2, 3));
        assert!(!a.contains(1, 0));
        assert!(!a.contains(7, 0));
        assert_eq!(SparsityPattern::dense(2, 3).nnz(), 6);
        assert_eq!(SparsityPattern::diagonal(3).inner(2), &[2]);
    }
}
