use thiserror::Error;

/// Error type returned by matrix construction, mutation and algebra.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Dimensions or sparsity patterns of the operands are incompatible
    #[error("Shapes do not match: {0}")]
    ShapesDoNotMatch(String),
    /// Write to a cell that is not part of the sparsity pattern
    #[error("Entry ({row}, {col}) is not in the sparsity pattern")]
    IndexOutOfRange {
        /// row index of the rejected entry
        row: usize,
        /// column index of the rejected entry
        col: usize,
    },
    /// An advertised code path that should never be reached
    #[error("Internal error: {0}")]
    InternalError(&'static str),
}

impl MatrixError {
    pub(crate) fn shapes(msg: impl Into<String>) -> Self {
        MatrixError::ShapesDoNotMatch(msg.into())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Error type returned when validating raw compressed arrays.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// Data is not sorted by minor index within each compressed row or column
    #[error("Data is not sorted by index within each compressed row or column")]
    BadIndexOrdering,
    #[error("Index value exceeds the matrix dimension")]
    /// Index value exceeds the matrix dimension
    BadIndex,
    #[error("Bad offset values")]
    /// Offset values are defective
    BadOffsets,
}

impl From<SparseFormatError> for MatrixError {
    fn from(e: SparseFormatError) -> Self {
        MatrixError::ShapesDoNotMatch(e.to_string())
    }
}

#[test]
fn test_error_messages() {
    let e = MatrixError::IndexOutOfRange { row: 1, col: 0 };
    assert_eq!(e.to_string(), "Entry (1, 0) is not in the sparsity pattern");
    let e: MatrixError = SparseFormatError::BadOffsets.into();
    assert!(matches!(e, MatrixError::ShapesDoNotMatch(_)));
}
