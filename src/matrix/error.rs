/// Errors raised by expression matrix construction and slicing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// Parallel arrays or declared shape disagree
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Row or column index outside the matrix
    #[error("{axis} index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// "row" or "column"
        axis: &'static str,
        /// Offending index
        index: usize,
        /// Axis length
        len: usize,
    },

    /// Compressed arrays violate the CSR/CSC structure
    #[error("invalid compressed structure: {0}")]
    InvalidStructure(String),

    /// Unknown matrix encoding tag
    #[error("unknown matrix encoding `{0}`")]
    UnknownEncoding(String),

    /// Accumulating repeated coordinates exceeded the count range
    #[error("counts at lane {major}, position {minor} overflow")]
    CountOverflow {
        /// Lane (row for CSR)
        major: usize,
        /// Position within the lane
        minor: usize,
    },

    /// A row or column total exceeded the count range
    #[error("total of lane {lane} overflows")]
    SumOverflow {
        /// Row or column index
        lane: usize,
    },
}
