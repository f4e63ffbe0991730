use super::stripes::{StripeLocks, StripedAssembler};
use super::SparseFormat;
use crate::algebra::*;
use log::debug;
use std::iter::zip;
use std::ops::Range;
use std::sync::Arc;

// The compressed buffers are stored with respect to an "outer" dimension
// (rows for CSR, columns for CSC) and an "inner" dimension indexed by
// `indices`.  Everything in this file is written in outer/inner terms.

#[derive(Debug, Clone)]
pub(crate) struct CompressedBuffers<T> {
    pub(crate) offsets: Vec<usize>,
    pub(crate) indices: Vec<usize>,
    pub(crate) entries: Vec<T>,
    pub(crate) stripes: StripeLocks,
}

#[derive(Debug)]
pub(crate) struct CompressedStorage<T> {
    pub(crate) nouter: usize,
    pub(crate) ninner: usize,
    pub(crate) eps: T,
    data: Arc<CompressedBuffers<T>>,
    unshareable: bool,
}

impl<T: FloatT> Clone for CompressedStorage<T> {
    fn clone(&self) -> Self {
        if self.unshareable {
            return self.deep_copy();
        }
        Self {
            nouter: self.nouter,
            ninner: self.ninner,
            eps: self.eps,
            data: Arc::clone(&self.data),
            unshareable: false,
        }
    }
}

impl<T> CompressedStorage<T>
where
    T: FloatT,
{
    /// Allocates zero entries over per-outer index lists.  The lists must be
    /// sorted, duplicate free and in bounds.
    pub(crate) fn from_lists(
        nouter: usize,
        ninner: usize,
        lists: &[Vec<usize>],
        num_mutexes: usize,
        eps: T,
    ) -> Self {
        debug_assert_eq!(lists.len(), nouter);
        let mut offsets = Vec::with_capacity(nouter + 1);
        offsets.push(0);
        let mut indices = Vec::with_capacity(lists.iter().map(|l| l.len()).sum());
        for list in lists {
            indices.extend_from_slice(list);
            offsets.push(indices.len());
        }
        let entries = vec![T::zero(); indices.len()];
        Self::from_parts_unchecked(nouter, ninner, offsets, indices, entries, num_mutexes, eps)
    }

    /// Wraps raw arrays after validating them.
    pub(crate) fn from_parts(
        nouter: usize,
        ninner: usize,
        offsets: Vec<usize>,
        indices: Vec<usize>,
        entries: Vec<T>,
        num_mutexes: usize,
        eps: T,
    ) -> Result<Self, SparseFormatError> {
        let out =
            Self::from_parts_unchecked(nouter, ninner, offsets, indices, entries, num_mutexes, eps);
        out.check_format()?;
        Ok(out)
    }

    pub(crate) fn from_parts_unchecked(
        nouter: usize,
        ninner: usize,
        offsets: Vec<usize>,
        indices: Vec<usize>,
        entries: Vec<T>,
        num_mutexes: usize,
        eps: T,
    ) -> Self {
        let data = CompressedBuffers {
            offsets,
            indices,
            entries,
            stripes: StripeLocks::new(num_mutexes),
        };
        Self {
            nouter,
            ninner,
            eps,
            data: Arc::new(data),
            unshareable: false,
        }
    }

    /// No structural entries at all
    pub(crate) fn empty(nouter: usize, ninner: usize, num_mutexes: usize, eps: T) -> Self {
        let offsets = vec![0; nouter + 1];
        Self::from_parts_unchecked(nouter, ninner, offsets, vec![], vec![], num_mutexes, eps)
    }

    /// Every cell structural and set to `value`
    pub(crate) fn full(nouter: usize, ninner: usize, value: T, num_mutexes: usize, eps: T) -> Self {
        let offsets = (0..=nouter).map(|i| i * ninner).collect();
        let indices = (0..nouter).flat_map(|_| 0..ninner).collect();
        let entries = vec![value; nouter * ninner];
        Self::from_parts_unchecked(nouter, ninner, offsets, indices, entries, num_mutexes, eps)
    }

    /// Private copy of all buffers with a fresh set of stripe locks
    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            nouter: self.nouter,
            ninner: self.ninner,
            eps: self.eps,
            data: Arc::new((*self.data).clone()),
            unshareable: false,
        }
    }

    /// Private copy of all buffers with `num_mutexes` fresh locks and tolerance `eps`
    pub(crate) fn private_copy(&self, num_mutexes: usize, eps: T) -> Self {
        Self::from_parts_unchecked(
            self.nouter,
            self.ninner,
            self.data.offsets.clone(),
            self.data.indices.clone(),
            self.data.entries.clone(),
            num_mutexes,
            eps,
        )
    }

    pub(crate) fn nnz(&self) -> usize {
        self.data.entries.len()
    }

    pub(crate) fn offsets(&self) -> &[usize] {
        &self.data.offsets
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.data.indices
    }

    pub(crate) fn entries(&self) -> &[T] {
        &self.data.entries
    }

    pub(crate) fn num_mutexes(&self) -> usize {
        self.data.stripes.len()
    }

    pub(crate) fn is_shared(&self) -> bool {
        Arc::strong_count(&self.data) > 1
    }

    pub(crate) fn mark_unshareable(&mut self) {
        self.unshareable = true;
    }

    /// Swaps in `next`, keeping the unshareable flag of `self`
    pub(crate) fn replace(&mut self, mut next: Self) {
        next.unshareable = self.unshareable;
        *self = next;
    }

    pub(crate) fn shares_buffers_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    #[inline]
    pub(crate) fn range(&self, outer: usize) -> Range<usize> {
        self.data.offsets[outer]..self.data.offsets[outer + 1]
    }

    /// Position of `(outer, inner)` in the entries array, if structural.
    pub(crate) fn locate(&self, outer: usize, inner: usize) -> Option<usize> {
        if outer >= self.nouter {
            return None;
        }
        let rng = self.range(outer);
        let first = rng.start;
        self.data.indices[rng]
            .binary_search(&inner)
            .ok()
            .map(|k| first + k)
    }

    pub(crate) fn get(&self, outer: usize, inner: usize) -> T {
        match self.locate(outer, inner) {
            Some(idx) => self.data.entries[idx],
            None => T::zero(),
        }
    }

    /// Mutable access to the buffers, making them private first if shared.
    pub(crate) fn buffers_mut(&mut self) -> &mut CompressedBuffers<T> {
        if Arc::strong_count(&self.data) > 1 {
            debug!(
                "copy-on-write split of {}x{} compressed buffers ({} entries)",
                self.nouter,
                self.ninner,
                self.nnz()
            );
        }
        // make_mut checks uniqueness and clones as one atomic step
        Arc::make_mut(&mut self.data)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [T] {
        &mut self.buffers_mut().entries
    }

    /// Overwrites a structural entry.  Returns false, without touching the
    /// buffers, if `(outer, inner)` is not structural.
    pub(crate) fn set(&mut self, outer: usize, inner: usize, value: T) -> bool {
        match self.locate(outer, inner) {
            Some(idx) => {
                self.buffers_mut().entries[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Adds to a structural entry under the stripe lock selected by `row`.
    pub(crate) fn add(&mut self, outer: usize, inner: usize, row: usize, value: T) -> bool {
        match self.locate(outer, inner) {
            Some(idx) => {
                let buf = self.buffers_mut();
                let _guard = buf.stripes.lock(row);
                buf.entries[idx] += value;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_outer(&mut self, outer: usize) {
        let rng = self.range(outer);
        if !rng.is_empty() {
            self.buffers_mut().entries[rng].set(T::zero());
        }
    }

    pub(crate) fn clear_inner(&mut self, inner: usize) {
        let hits: Vec<usize> = (0..self.nouter)
            .filter_map(|outer| self.locate(outer, inner))
            .collect();
        if !hits.is_empty() {
            let entries = &mut self.buffers_mut().entries;
            for idx in hits {
                entries[idx] = T::zero();
            }
        }
    }

    pub(crate) fn scale(&mut self, alpha: T) {
        let buf = self.buffers_mut();
        let _guards = buf.stripes.lock_all();
        buf.entries.scale(alpha);
    }

    /// `self += alpha * x` over an identical structure.
    pub(crate) fn axpy(&mut self, alpha: T, x: &Self) -> Result<(), MatrixError> {
        if !self.same_structure(x) {
            return Err(MatrixError::shapes(
                "axpy requires operands with identical sparsity patterns",
            ));
        }
        // self and x may share buffers, so read x before the split
        let xvals = x.data.entries.clone();
        let buf = self.buffers_mut();
        let _guards = buf.stripes.lock_all();
        buf.entries.axpby(alpha, &xvals, T::one());
        Ok(())
    }

    pub(crate) fn same_structure(&self, other: &Self) -> bool {
        self.nouter == other.nouter
            && self.ninner == other.ninner
            && (Arc::ptr_eq(&self.data, &other.data)
                || (self.data.offsets == other.data.offsets
                    && self.data.indices == other.data.indices))
    }

    /// Per-outer index lists, optionally dropping entries with `|v| <= tol`.
    pub(crate) fn outer_lists(&self, prune: bool, tol: T) -> Vec<Vec<usize>> {
        (0..self.nouter)
            .map(|outer| {
                let rng = self.range(outer);
                zip(&self.data.indices[rng.clone()], &self.data.entries[rng])
                    .filter(|&(_, &v)| !prune || is_nonzero(v, tol))
                    .map(|(&i, _)| i)
                    .collect()
            })
            .collect()
    }

    /// Same matrix stored with outer and inner swapped, i.e. the CSR arrays of
    /// a CSC matrix and vice versa.
    pub(crate) fn transpose(&self) -> Self {
        let (m, n) = (self.nouter, self.ninner);
        let nnz = self.nnz();

        // count entries per inner index, then prefix sum
        let mut offsets = vec![0usize; n + 1];
        for &i in self.indices() {
            offsets[i + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut next = offsets.clone();
        let mut indices = vec![0usize; nnz];
        let mut entries = vec![T::zero(); nnz];
        for outer in 0..m {
            for k in self.range(outer) {
                let i = self.data.indices[k];
                let dest = next[i];
                indices[dest] = outer;
                entries[dest] = self.data.entries[k];
                next[i] += 1;
            }
        }
        Self::from_parts_unchecked(n, m, offsets, indices, entries, self.num_mutexes(), self.eps)
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.data.entries.is_finite()
    }

    pub(crate) fn sup_norm(&self) -> T {
        self.data.entries.norm_inf()
    }

    /// Replaces the buffers with a freshly built set, keeping the stripe count.
    pub(crate) fn replace_with(
        &mut self,
        nouter: usize,
        ninner: usize,
        offsets: Vec<usize>,
        indices: Vec<usize>,
        entries: Vec<T>,
    ) -> Result<(), MatrixError> {
        let rebuilt = Self::from_parts(
            nouter,
            ninner,
            offsets,
            indices,
            entries,
            self.num_mutexes(),
            self.eps,
        )
        .map_err(|_| MatrixError::InternalError("malformed compressed product"))?;
        debug!(
            "rebuilt compressed storage {}x{} -> {}x{} with {} entries",
            self.nouter,
            self.ninner,
            nouter,
            ninner,
            rebuilt.nnz()
        );
        self.replace(rebuilt);
        Ok(())
    }

    /// Compressed-by-compressed product `left * right`, both stored with outer
    /// dimension first.  Entries with `|v| <= tol` are dropped.
    pub(crate) fn product_parts(
        left: &Self,
        right: &Self,
        tol: T,
    ) -> Result<(Vec<usize>, Vec<usize>, Vec<T>), MatrixError> {
        if left.ninner != right.nouter {
            return Err(MatrixError::shapes(format!(
                "inner dimensions {} and {} differ",
                left.ninner, right.nouter
            )));
        }
        let mut acc = SparseAccumulator::new(right.ninner);
        let mut offsets = Vec::with_capacity(left.nouter + 1);
        let mut indices = Vec::new();
        let mut entries = Vec::new();
        offsets.push(0);

        for outer in 0..left.nouter {
            for k in left.range(outer) {
                let a = left.data.entries[k];
                if a == T::zero() {
                    continue;
                }
                let mid = left.data.indices[k];
                for j in right.range(mid) {
                    acc.add(right.data.indices[j], a * right.data.entries[j]);
                }
            }
            acc.drain_into(&mut indices, &mut entries, tol);
            offsets.push(indices.len());
        }
        Ok((offsets, indices, entries))
    }

    /// Raw arrays of `self * B` for a right factor given by element lookup,
    /// with `self` stored row-major (outer = row).  `B` has `right_rows`
    /// rows and `right_cols` columns.
    pub(crate) fn rowwise_product_parts(
        &self,
        right_cols: usize,
        right: impl Fn(usize, usize) -> T,
        tol: T,
    ) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        let mut acc = SparseAccumulator::new(right_cols);
        let mut offsets = Vec::with_capacity(self.nouter + 1);
        let mut indices = Vec::new();
        let mut entries = Vec::new();
        offsets.push(0);

        for outer in 0..self.nouter {
            for k in self.range(outer) {
                let a = self.data.entries[k];
                if a == T::zero() {
                    continue;
                }
                let mid = self.data.indices[k];
                for j in 0..right_cols {
                    let b = right(mid, j);
                    if b != T::zero() {
                        acc.add(j, a * b);
                    }
                }
            }
            acc.drain_into(&mut indices, &mut entries, tol);
            offsets.push(indices.len());
        }
        (offsets, indices, entries)
    }

    /// Raw column-major arrays of `self * B` for a right factor given by
    /// element lookup, with `self` stored column-major (outer = column).
    pub(crate) fn colwise_product_parts(
        &self,
        right_cols: usize,
        right: impl Fn(usize, usize) -> T,
        tol: T,
    ) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        // rows of the result are the inner dimension of self
        let mut acc = SparseAccumulator::new(self.ninner);
        let mut offsets = Vec::with_capacity(right_cols + 1);
        let mut indices = Vec::new();
        let mut entries = Vec::new();
        offsets.push(0);

        for j in 0..right_cols {
            for mid in 0..self.nouter {
                let b = right(mid, j);
                if b == T::zero() {
                    continue;
                }
                for k in self.range(mid) {
                    acc.add(self.data.indices[k], self.data.entries[k] * b);
                }
            }
            acc.drain_into(&mut indices, &mut entries, tol);
            offsets.push(indices.len());
        }
        (offsets, indices, entries)
    }

    pub(crate) fn assembler(&mut self, format: SparseFormat) -> StripedAssembler<'_, T> {
        let buf = self.buffers_mut();
        StripedAssembler::new(
            &buf.offsets,
            &buf.indices,
            &buf.stripes,
            &mut buf.entries,
            format,
        )
    }

    /// Check that the compressed arrays are correctly formatted.
    pub(crate) fn check_format(&self) -> Result<(), SparseFormatError> {
        let data = &self.data;
        if data.indices.len() != data.entries.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if data.offsets.is_empty()
            || (data.offsets.len() - 1) != self.nouter
            || data.offsets[self.nouter] != data.indices.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for offset monotonicity
        if data.offsets[0] != 0 || data.offsets.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadOffsets);
        }

        //check for index monotonicity within each outer slice
        for outer in 0..self.nouter {
            if data.indices[self.range(outer)]
                .windows(2)
                .any(|c| c[0] >= c[1])
            {
                return Err(SparseFormatError::BadIndexOrdering);
            }
        }
        //check for indices out of bounds
        if !data.indices.iter().all(|i| i < &self.ninner) {
            return Err(SparseFormatError::BadIndex);
        }

        Ok(())
    }
}

// Dense scratch row with a list of touched positions, used to build one
// compressed slice of a product at a time.
struct SparseAccumulator<T> {
    values: Vec<T>,
    touched: Vec<bool>,
    list: Vec<usize>,
}

impl<T: FloatT> SparseAccumulator<T> {
    fn new(n: usize) -> Self {
        Self {
            values: vec![T::zero(); n],
            touched: vec![false; n],
            list: Vec::new(),
        }
    }

    #[inline]
    fn add(&mut self, i: usize, v: T) {
        if !self.touched[i] {
            self.touched[i] = true;
            self.list.push(i);
        }
        self.values[i] += v;
    }

    // appends the surviving entries in index order and resets the scratch
    fn drain_into(&mut self, indices: &mut Vec<usize>, entries: &mut Vec<T>, tol: T) {
        self.list.sort_unstable();
        for &i in &self.list {
            let v = self.values[i];
            if is_nonzero(v, tol) {
                indices.push(i);
                entries.push(v);
            }
            self.values[i] = T::zero();
            self.touched[i] = false;
        }
        self.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // [1 . 2]
    // [. . 3]
    fn test_storage() -> CompressedStorage<f64> {
        CompressedStorage::from_parts(2, 3, vec![0, 2, 3], vec![0, 2, 2], vec![1., 2., 3.], 2, 1e-18)
            .unwrap()
    }

    #[test]
    fn test_cow_split() {
        let a = test_storage();
        let mut b = a.clone();
        assert!(a.is_shared() && b.is_shared());
        assert!(b.set(1, 2, 7.));
        assert!(!a.is_shared() && !b.is_shared());
        assert_eq!(a.get(1, 2), 3.);
        assert_eq!(b.get(1, 2), 7.);
        assert_eq!(b.num_mutexes(), 2);
    }

    #[test]
    fn test_failed_write_does_not_split() {
        let a = test_storage();
        let mut b = a.clone();
        assert!(!b.set(1, 0, 1.));
        assert!(!b.add(0, 1, 0, 1.));
        assert!(b.shares_buffers_with(&a));
    }

    #[test]
    fn test_unshareable_clone() {
        let mut a = test_storage();
        a.mark_unshareable();
        let b = a.clone();
        assert!(!b.shares_buffers_with(&a));
        // the copy itself is shareable again
        let c = b.clone();
        assert!(c.shares_buffers_with(&b));
    }

    #[test]
    fn test_transpose_and_format() {
        let a = test_storage();
        let t = a.transpose();
        assert!(t.check_format().is_ok());
        assert_eq!(t.offsets(), &[0, 1, 1, 3]);
        assert_eq!(t.indices(), &[0, 0, 1]);
        assert_eq!(t.entries(), &[1., 2., 3.]);

        let bad = CompressedStorage::<f64>::from_parts(2, 3, vec![0, 2, 1], vec![0, 2], vec![1., 2.], 1, 0.);
        assert_eq!(bad.unwrap_err(), SparseFormatError::IncompatibleDimension);
        let bad = CompressedStorage::<f64>::from_parts(1, 3, vec![0, 2], vec![2, 0], vec![1., 2.], 1, 0.);
        assert_eq!(bad.unwrap_err(), SparseFormatError::BadIndexOrdering);
        let bad = CompressedStorage::<f64>::from_parts(1, 3, vec![0, 1], vec![5], vec![1.], 1, 0.);
        assert_eq!(bad.unwrap_err(), SparseFormatError::BadIndex);
    }

    #[test]
    fn test_product_parts() {
        // [1 . 2]   [1 .]   [ 1 4]
        // [. . 3] * [. 1] = [ . 6]
        //           [. 2]
        let a = test_storage();
        let b = CompressedStorage::from_parts(3, 2, vec![0, 1, 2, 3], vec![0, 1, 1], vec![1., 1., 2.], 1, 0.)
            .unwrap();
        let (offsets, indices, entries) = CompressedStorage::product_parts(&a, &b, 0.).unwrap();
        assert_eq!(offsets, vec![0, 2, 3]);
        assert_eq!(indices, vec![0, 1, 1]);
        assert_eq!(entries, vec![1., 4., 6.]);

        assert!(CompressedStorage::product_parts(&a, &a, 0.).is_err());
    }
}
