#![allow(non_snake_case)]

use crate::algebra::FloatT;
use std::iter::zip;

/// Sparse vector type, used as the right hand side of the sparse
/// matrix-vector products `mv_sparse` and `mtv_sparse`.
///
/// Indices in `nzind` are strictly increasing.

#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<T = f64> {
    /// vector dimension
    pub n: usize,
    /// vector of entry indices
    pub nzind: Vec<usize>,
    /// vector of non-zero vector elements
    pub nzval: Vec<T>,
}

/// Creates a `SparseVector` from a dense slice.
impl<T> SparseVector<T>
where
    T: FloatT,
{
    pub fn new(values: &[T]) -> Self {
        let mut nzind = Vec::new();
        let mut nzval = Vec::new();

        for (i, &v) in values.iter().enumerate() {
            if v != T::zero() {
                nzind.push(i);
                nzval.push(v);
            }
        }
        SparseVector {
            n: values.len(),
            nzind,
            nzval,
        }
    }

    /// Zero vector of dimension `n`
    pub fn zeros(n: usize) -> Self {
        SparseVector {
            n,
            nzind: Vec::new(),
            nzval: Vec::new(),
        }
    }

    pub fn nnz(&self) -> usize {
        self.nzval.len()
    }

    /// Value at index `i`, zero if not stored
    pub fn get(&self, i: usize) -> T {
        match self.nzind.binary_search(&i) {
            Ok(k) => self.nzval[k],
            Err(_) => T::zero(),
        }
    }

    pub fn dropzeros(&mut self) {
        let mut writeidx: usize = 0;

        for readidx in 0..self.nzval.len() {
            let val = self.nzval[readidx];
            let idx = self.nzind[readidx];

            // If nonzero and a shift so far, move the value
            if val != T::zero() {
                if writeidx != readidx {
                    self.nzval[writeidx] = val;
                    self.nzind[writeidx] = idx;
                }
                writeidx += 1;
            }
        }

        self.nzind.truncate(writeidx);
        self.nzval.truncate(writeidx);
    }
}

impl<T> From<SparseVector<T>> for Vec<T>
where
    T: FloatT,
{
    fn from(sv: SparseVector<T>) -> Vec<T> {
        let mut v = vec![T::zero(); sv.n];
        for (i, nz) in zip(sv.nzind, sv.nzval) {
            v[i] = nz;
        }
        v
    }
}

// sum of vals[k] * x[idx[k]] over the intersection of a sorted index
// slice with the stored indices of x
pub(crate) fn sparse_dot<T: FloatT>(idx: &[usize], vals: &[T], x: &SparseVector<T>) -> T {
    let (mut i, mut j) = (0, 0);
    let mut out = T::zero();
    while i < idx.len() && j < x.nzind.len() {
        match idx[i].cmp(&x.nzind[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out += vals[i] * x.nzval[j];
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[test]
fn test_sparsevector_new() {
    let v = vec![0.1, 0.3, 0.0, 0.0, 0.4, 0.0];

    let vs = SparseVector::new(&v);

    assert_eq!(vs.n, v.len());
    assert_eq!(vs.nzind, vec![0, 1, 4]);
    assert_eq!(vs.nzval, vec![0.1, 0.3, 0.4]);
    assert_eq!(vs.get(4), 0.4);
    assert_eq!(vs.get(2), 0.0);

    let vback: Vec<f64> = vs.into();
    assert_eq!(v, vback);
}

#[test]
fn test_sparsevector_dropzeros() {
    let x = vec![0.1, 0.3, 0.2, 0.0, 0.4, 0.0];
    let y = vec![0.1, 0.3, 0.0, 0.0, 0.4, 0.0];

    let mut xs = SparseVector::new(&x);
    xs.nzval[2] = 0.0;
    xs.dropzeros();

    let ys = SparseVector::new(&y);

    assert_eq!(xs, ys);
}

#[test]
fn test_sparse_dot() {
    let x = SparseVector::new(&[0., 2., 0., 3.]);
    // row with entries at columns 0, 1 and 3
    assert_eq!(sparse_dot(&[0, 1, 3], &[5., 1., 2.], &x), 8.);
    assert_eq!(sparse_dot(&[0, 2], &[5., 1.], &x), 0.);
}
