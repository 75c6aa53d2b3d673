//! # stereo-exp - Spatial Transcriptomics Expression Datasets
//!
//! `stereo-exp` turns raw spatial transcriptomics spot tables into analysis
//! ready expression datasets and stores them in a single-file container.
//!
//! ## Key Features
//!
//! - **Spot Ingestion**: Streams delimited `x`/`y`/`geneID`/`UMICount` tables,
//!   drops incomplete rows, and accumulates counts into a sparse matrix.
//!
//! - **Spatial Binning**: Aggregates spots onto a square grid, or groups them
//!   by segmentation label and records each cell's convex hull and centroid.
//!
//! - **Dataset Operations**: Structural checks, index and name based
//!   subsetting (in place or as a copy), dense labelled tables, QC columns.
//!
//! - **Container Format**: A ZIP archive of single-column Parquet datasets
//!   arranged in groups, readable by any Parquet tool.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stereo_exp::prelude::*;
//!
//! let sink = LogSink::new("quickstart");
//! let mut data = StereoExpData::new()
//!     .with_file("spots.tsv", None)
//!     .with_output("spots.stereo")
//!     .with_bin_size(50);
//! data.read(&IngestOptions::new(), &sink)?;
//!
//! let table = data.expression_table(None, Some(&["Gapdh"][..]))?;
//! println!("{} cells express Gapdh", table.rows.iter().filter(|r| r[0] > 0).count());
//!
//! let stats = data.write(&ContainerConfig::default(), &sink)?;
//! println!("wrote {} bytes", stats.total_size_bytes);
//! # Ok::<(), stereo_exp::dataset::DatasetError>(())
//! ```
//!
//! This creates a container laid out as:
//! ```text
//! spots.stereo
//! ├── mimetype
//! ├── manifest.json
//! ├── cells/      (cell_name, QC columns, cell_point hulls)
//! ├── genes/      (gene_name, QC columns)
//! ├── position.parquet
//! ├── bin_type.parquet, bin_size.parquet
//! └── exp_matrix/ (csr_matrix | csc_matrix) or exp_matrix.parquet (dense)
//! ```
//!
//! ## Diagnostics
//!
//! Library operations report through an injected
//! [`DiagnosticsSink`](diagnostics::DiagnosticsSink) rather than a global
//! logger. The binary installs `env_logger` and passes a
//! [`LogSink`](diagnostics::LogSink).

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod binning;
pub mod container;
pub mod dataset;
pub mod diagnostics;
pub mod geometry;
pub mod ingest;
pub mod matrix;
pub mod metadata;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::binning::{binner_for, BinType, SpatialBinner, DEFAULT_BIN_SIZE};
    pub use crate::container::{
        read_container, summarize, validate_container, CompressionType, ContainerConfig,
        ContainerError, ContainerWriter, ValidationReport, WriteStats,
    };
    pub use crate::dataset::{
        Axis, DatasetError, DatasetParts, ExpressionTable, FileFormat, StereoExpData,
    };
    pub use crate::diagnostics::{DiagnosticsSink, LogSink, MemorySink, NullSink};
    pub use crate::geometry::{convex_hull, Point, Polygon};
    pub use crate::ingest::{ingest_path, ingest_reader, IngestError, IngestOptions};
    pub use crate::matrix::{Count, ExpressionMatrix, MatrixFormat};
    pub use crate::metadata::{CellAttribute, CellTable, GeneAttribute, GeneTable, MetadataTable};
}
