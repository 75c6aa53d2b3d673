use std::path::PathBuf;

use crate::binning::BinningError;
use crate::matrix::MatrixError;
use crate::metadata::MetadataError;

/// Errors raised while reading or writing a `.stereo` container
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON descriptor error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid container
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Container file does not exist
    #[error("the container {} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// Write requested with no destination
    #[error("the output path must be set before writing")]
    OutputPath,

    /// Stored matrix arrays are inconsistent
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Stored metadata is inconsistent
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Stored bin type is not recognised
    #[error("Bin type error: {0}")]
    Binning(#[from] BinningError),
}
