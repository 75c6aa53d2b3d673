use crate::matrix::MatrixError;

/// Errors raised by cell and gene metadata tables
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    /// An attribute column does not match the number of names
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        /// Column name
        column: String,
        /// Number of names in the table
        expected: usize,
        /// Number of values in the column
        found: usize,
    },

    /// Selection index past the end of the table
    #[error("index {index} out of bounds for {len} entries")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Table length
        len: usize,
    },

    /// Name lookup failed
    #[error("`{0}` not found")]
    NameNotFound(String),

    /// Attribute name with no matching column
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    /// QC inputs disagree with the table
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
