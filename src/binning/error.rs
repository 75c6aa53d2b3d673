/// Errors raised while configuring or running a spatial binner
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BinningError {
    /// Bin type string outside the permitted set
    #[error("the bin type `{0}` is not in the range, expected `bins` or `cell_bins`")]
    InvalidBinType(String),

    /// Grid bin size must be a positive integer
    #[error("bin size must be positive, got {0}")]
    InvalidBinSize(u32),

    /// Coordinate arrays of different lengths
    #[error("coordinate arrays differ in length: {x} x values, {y} y values")]
    LengthMismatch {
        /// Number of x values
        x: usize,
        /// Number of y values
        y: usize,
    },

    /// Cell-boundary binning was asked to run without cell labels
    #[error("cell-boundary binning requires a cell label per point")]
    MissingLabels,

    /// Grid arithmetic left the `i64` range
    #[error("coordinate {coord} is too far from the minimum {min} to bin")]
    CoordinateOverflow {
        /// Coordinate (or grid index) being converted
        coord: i64,
        /// Axis minimum
        min: i64,
    },
}
