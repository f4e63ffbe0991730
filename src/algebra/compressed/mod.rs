mod storage;
pub(crate) use storage::*;
mod stripes;
pub use stripes::StripedAssembler;

use crate::algebra::{MatrixError, SparsityPattern};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compressed storage layout of a sparse matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SparseFormat {
    /// compressed sparse row
    #[default]
    Csr,
    /// compressed sparse column
    Csc,
}

// Checks a row-wise pattern against matrix dimensions and returns its
// normalized rows.
pub(crate) fn validated_rows(
    rows: usize,
    cols: usize,
    pattern: &SparsityPattern,
) -> Result<Vec<Vec<usize>>, MatrixError> {
    if pattern.size() != rows {
        return Err(MatrixError::shapes(format!(
            "pattern has {} rows, matrix has {}",
            pattern.size(),
            rows
        )));
    }
    pattern
        .iter()
        .enumerate()
        .map(|(r, row)| {
            if let Some(&c) = row.iter().find(|&&c| c >= cols) {
                return Err(MatrixError::shapes(format!(
                    "pattern entry ({}, {}) exceeds {} columns",
                    r, c, cols
                )));
            }
            let mut row = row.clone();
            row.sort_unstable();
            row.dedup();
            Ok(row)
        })
        .collect()
}

// Transposes sorted index lists, e.g. the rows of a matrix with `n` columns
// into its columns.  The output lists are sorted.
pub(crate) fn transpose_lists(lists: &[Vec<usize>], n: usize) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); n];
    for (i, list) in lists.iter().enumerate() {
        for &j in list {
            out[j].push(i);
        }
    }
    out
}
