//! # `.stereo` Container Format
//!
//! A dataset is persisted as a ZIP archive of single-column Parquet
//! datasets arranged in groups:
//!
//! ```text
//! {name}.stereo (ZIP archive)
//! ├── mimetype                    # "application/vnd.stereo-exp" (Stored, first entry)
//! ├── manifest.json               # counts, matrix format, provenance (Deflated)
//! ├── cells/
//! │   ├── .group.json             # encoding-type "dataframe", member order
//! │   ├── cell_name.parquet
//! │   ├── total_counts.parquet    # optional QC columns
//! │   └── cell_point/             # cell-boundary datasets only
//! │       ├── .group.json         # encoding-type "polygon_list"
//! │       ├── offsets.parquet     # n_cells + 1 vertex offsets
//! │       └── coords.parquet      # (n_vertices, 2)
//! ├── genes/
//! │   ├── .group.json
//! │   └── gene_name.parquet
//! ├── position.parquet            # (n_cells, 2) float64
//! ├── bin_type.parquet            # scalar string, absent when unset
//! ├── bin_size.parquet            # scalar int64
//! └── exp_matrix.parquet          # dense (n_cells, n_genes) uint64
//!     or exp_matrix/              # encoding-type csr_matrix | csc_matrix
//!        ├── .group.json
//!        ├── data.parquet
//!        ├── indices.parquet
//!        └── indptr.parquet
//! ```
//!
//! Parquet entries are Stored (their pages are already compressed) and JSON
//! entries are Deflated. Readers dispatch on the top-level name and skip
//! names they do not know. Writers build the archive in a temporary file
//! beside the destination and move it into place only once it is complete.

mod array;
mod config;
mod error;
mod layout;
mod reader;
mod validate;
mod writer;

#[cfg(test)]
mod tests;

pub use array::{ArrayData, Dataset};
pub use config::{CompressionType, ContainerConfig};
pub use error::ContainerError;
pub use layout::{GroupDescriptor, Manifest};
pub use reader::{read_container, summarize, ContainerSummary, EntryInfo};
pub use validate::{validate_container, CheckStatus, ValidationCheck, ValidationReport};
pub use writer::{ContainerWriter, WriteStats};

/// MIME type stored in the `mimetype` entry
pub const STEREO_MIMETYPE: &str = "application/vnd.stereo-exp";

/// Container format version
pub const FORMAT_VERSION: &str = "1.0.0";

/// Container file extension
pub const STEREO_EXTENSION: &str = "stereo";

/// Parquet footer key holding a dataset's JSON shape
pub const KEY_SHAPE: &str = "stereo:shape";

/// Column name of every dataset
pub const VALUES_COLUMN: &str = "values";

/// Name of the descriptor file inside each group
pub const GROUP_DESCRIPTOR: &str = ".group.json";

/// Top-level entry names
pub mod entries {
    /// MIME type marker
    pub const MIMETYPE: &str = "mimetype";
    /// Manifest document
    pub const MANIFEST: &str = "manifest.json";
    /// Cell metadata group
    pub const CELLS: &str = "cells";
    /// Gene metadata group
    pub const GENES: &str = "genes";
    /// Cell centers
    pub const POSITION: &str = "position";
    /// Bin type scalar
    pub const BIN_TYPE: &str = "bin_type";
    /// Bin size scalar
    pub const BIN_SIZE: &str = "bin_size";
    /// Expression matrix (dataset or group)
    pub const EXP_MATRIX: &str = "exp_matrix";
    /// Cell name member of the cells group
    pub const CELL_NAME: &str = "cell_name";
    /// Gene name member of the genes group
    pub const GENE_NAME: &str = "gene_name";
    /// Cell boundary subgroup of the cells group
    pub const CELL_POINT: &str = "cell_point";
}

/// Path of a dataset entry inside the archive.
pub(crate) fn dataset_path(path: &str) -> String {
    format!("{path}.parquet")
}

/// Path of a group descriptor inside the archive.
pub(crate) fn descriptor_path(group: &str) -> String {
    format!("{group}/{GROUP_DESCRIPTOR}")
}
