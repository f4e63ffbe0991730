use super::SparseFormat;
use crate::algebra::{FloatT, MatrixError};
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed-size set of mutexes used to serialize row-targeted updates.
///
/// Cloning produces a fresh, unlocked set of the same size.  Locks are
/// never shared between a matrix and its private copy.
pub(crate) struct StripeLocks {
    locks: Vec<Mutex<()>>,
}

impl StripeLocks {
    /// A set of `n` locks.  At least one lock is always allocated.
    pub(crate) fn new(n: usize) -> Self {
        let n = n.max(1);
        log::trace!("allocating {} stripe locks", n);
        Self {
            locks: (0..n).map(|_| Mutex::new(())).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }

    /// Locks the stripe owning `row`.
    pub(crate) fn lock(&self, row: usize) -> MutexGuard<'_, ()> {
        // the guarded value is (), so a poisoned lock carries no broken state
        self.locks[row % self.locks.len()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks every stripe in index order.
    pub(crate) fn lock_all(&self) -> Vec<MutexGuard<'_, ()>> {
        self.locks
            .iter()
            .map(|m| m.lock().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }
}

impl Clone for StripeLocks {
    fn clone(&self) -> Self {
        StripeLocks::new(self.len())
    }
}

impl std::fmt::Debug for StripeLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeLocks")
            .field("len", &self.locks.len())
            .finish()
    }
}

/// Shared-reference view of a compressed matrix for concurrent accumulation.
///
/// Obtained from `assembler()` on [`CsrMatrix`](crate::algebra::CsrMatrix) or
/// [`CscMatrix`](crate::algebra::CscMatrix), which makes the buffers private
/// once up front.  The view can then be shared across threads, and each
/// [`add_to_entry`](StripedAssembler::add_to_entry) call takes the stripe lock
/// of its row, so that updates of rows on different stripes proceed in
/// parallel and updates colliding on one stripe serialize.
///
/// ```
/// use sparsela::algebra::*;
///
/// let mut A = CsrMatrix::<f64>::new(4, 4, &SparsityPattern::diagonal(4), 4).unwrap();
/// let assembler = A.assembler();
/// std::thread::scope(|s| {
///     for i in 0..4 {
///         let assembler = &assembler;
///         s.spawn(move || assembler.add_to_entry(i, i, 1.0).unwrap());
///     }
/// });
/// assert_eq!(A.get_entry(3, 3), 1.0);
/// ```
pub struct StripedAssembler<'a, T> {
    offsets: &'a [usize],
    indices: &'a [usize],
    stripes: &'a StripeLocks,
    entries: *mut T,
    len: usize,
    format: SparseFormat,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: every write through `entries` targets the slot of a single (row, col)
// cell and happens while the stripe lock of that row is held.  A given slot
// belongs to exactly one row, so two threads can only touch the same slot while
// holding the same lock.  The index arrays are only read.
unsafe impl<T: FloatT> Send for StripedAssembler<'_, T> {}
unsafe impl<T: FloatT> Sync for StripedAssembler<'_, T> {}

impl<'a, T> StripedAssembler<'a, T>
where
    T: FloatT,
{
    pub(crate) fn new(
        offsets: &'a [usize],
        indices: &'a [usize],
        stripes: &'a StripeLocks,
        entries: &'a mut [T],
        format: SparseFormat,
    ) -> Self {
        Self {
            offsets,
            indices,
            stripes,
            len: entries.len(),
            entries: entries.as_mut_ptr(),
            format,
            _marker: PhantomData,
        }
    }

    fn locate(&self, row: usize, col: usize) -> Option<usize> {
        let (outer, inner) = match self.format {
            SparseFormat::Csr => (row, col),
            SparseFormat::Csc => (col, row),
        };
        if outer + 1 >= self.offsets.len() {
            return None;
        }
        let first = self.offsets[outer];
        let last = self.offsets[outer + 1];
        self.indices[first..last]
            .binary_search(&inner)
            .ok()
            .map(|k| first + k)
    }

    /// number of stripe locks
    pub fn num_mutexes(&self) -> usize {
        self.stripes.len()
    }

    /// Adds `value` to the structural entry `(row, col)` under the stripe lock
    /// of `row`.  Fails with `IndexOutOfRange` if the entry is not structural.
    pub fn add_to_entry(&self, row: usize, col: usize, value: T) -> Result<(), MatrixError> {
        let idx = self
            .locate(row, col)
            .ok_or(MatrixError::IndexOutOfRange { row, col })?;
        debug_assert!(idx < self.len);
        let _guard = self.stripes.lock(row);
        // SAFETY: idx < len, and the row lock is held (see impl Sync above)
        unsafe {
            *self.entries.add(idx) += value;
        }
        Ok(())
    }

    /// Reads entry `(row, col)` under the stripe lock of `row`.
    pub fn get_entry(&self, row: usize, col: usize) -> T {
        match self.locate(row, col) {
            Some(idx) => {
                let _guard = self.stripes.lock(row);
                // SAFETY: as for add_to_entry
                unsafe { *self.entries.add(idx) }
            }
            None => T::zero(),
        }
    }
}

#[test]
fn test_stripe_locks() {
    let s = StripeLocks::new(0);
    assert_eq!(s.len(), 1);
    let s = StripeLocks::new(3);
    {
        let _g = s.lock(4);
        // stripe 1 is held, the others are free
        assert!(s.locks[1].try_lock().is_err());
        assert!(s.locks[0].try_lock().is_ok());
    }
    assert_eq!(s.lock_all().len(), 3);
    assert_eq!(s.clone().len(), 3);
}
