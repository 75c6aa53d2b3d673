use std::path::PathBuf;

use crate::binning::BinningError;
use crate::container::ContainerError;
use crate::ingest::IngestError;
use crate::matrix::MatrixError;
use crate::metadata::MetadataError;

use super::Axis;

/// Errors surfaced by dataset operations
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Invalid bin type, inconsistent shapes, or out-of-range indices
    #[error("validation error: {0}")]
    Validation(String),

    /// Name lookup failed during subsetting
    #[error("{axis} `{name}` not found")]
    Key {
        /// Axis the name was looked up on
        axis: Axis,
        /// Missing name
        name: String,
    },

    /// Malformed input record
    #[error("parse error at line {line}, column `{column}`: {message}")]
    Parse {
        /// 1-based input line
        line: u64,
        /// Column name
        column: String,
        /// What went wrong
        message: String,
    },

    /// Ingestion produced no data
    #[error("the input contains no usable records")]
    EmptyDataset,

    /// Input file does not exist
    #[error("the input file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// Write requested without an output path
    #[error("the output path must be set before writing")]
    OutputPath,

    /// File format outside the supported set
    #[error("unsupported file format `{0}`")]
    UnsupportedFormat(String),

    /// Other ingestion failure
    #[error("ingest error: {0}")]
    Ingest(IngestError),

    /// Other container failure
    #[error("container error: {0}")]
    Container(ContainerError),

    /// Matrix construction or slicing failure
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Delimited table output failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for DatasetError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse {
                line,
                column,
                value,
            } => DatasetError::Parse {
                line,
                column,
                message: format!("cannot parse `{value}`"),
            },
            IngestError::MissingColumn(column) => DatasetError::Parse {
                line: 1,
                column,
                message: "required column missing from header".to_string(),
            },
            IngestError::Empty => DatasetError::EmptyDataset,
            IngestError::MissingFile(path) => DatasetError::MissingFile(path),
            IngestError::Binning(err) => err.into(),
            other => DatasetError::Ingest(other),
        }
    }
}

impl From<ContainerError> for DatasetError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::MissingFile(path) => DatasetError::MissingFile(path),
            ContainerError::OutputPath => DatasetError::OutputPath,
            other => DatasetError::Container(other),
        }
    }
}

impl From<BinningError> for DatasetError {
    fn from(err: BinningError) -> Self {
        DatasetError::Validation(err.to_string())
    }
}

impl From<MetadataError> for DatasetError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Matrix(err) => DatasetError::Matrix(err),
            other => DatasetError::Validation(other.to_string()),
        }
    }
}
