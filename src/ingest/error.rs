use std::path::PathBuf;

use crate::binning::BinningError;
use crate::matrix::MatrixError;

/// Errors raised while turning a raw spot file into a dataset
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error reading the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text framing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Input file does not exist
    #[error("the input file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// Required column absent from the header
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    /// A field could not be parsed as the expected number
    #[error("line {line}, column `{column}`: cannot parse `{value}`")]
    Parse {
        /// 1-based line number in the input
        line: u64,
        /// Column name
        column: String,
        /// Raw field value
        value: String,
    },

    /// No rows survived cleaning
    #[error("no spots left after dropping incomplete rows")]
    Empty,

    /// Rejected ingestion options
    #[error("invalid ingest options: {0}")]
    InvalidOptions(String),

    /// Binning failure
    #[error(transparent)]
    Binning(#[from] BinningError),

    /// Matrix assembly failure
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}
