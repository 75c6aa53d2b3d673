//! JSON documents stored alongside the Parquet datasets.

use serde::{Deserialize, Serialize};

use super::FORMAT_VERSION;

/// Group descriptor stored as `<group>/.group.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupDescriptor {
    /// How the members encode the group (`dataframe`, `csr_matrix`, ...)
    pub encoding_type: String,
    /// Version of the encoding
    pub encoding_version: String,
    /// Logical shape of the group
    pub shape: Vec<usize>,
    /// Member names in storage order
    pub members: Vec<String>,
}

impl GroupDescriptor {
    /// Create a descriptor at the current encoding version.
    pub fn new(encoding_type: &str, shape: Vec<usize>, members: Vec<String>) -> Self {
        Self {
            encoding_type: encoding_type.to_string(),
            encoding_version: ENCODING_VERSION.to_string(),
            shape,
            members,
        }
    }
}

/// Version written into every group descriptor
pub const ENCODING_VERSION: &str = "0.1.0";

/// Encoding type of the cell and gene groups
pub const ENCODING_DATAFRAME: &str = "dataframe";

/// Encoding type of the cell boundary group
pub const ENCODING_POLYGONS: &str = "polygon_list";

/// Container manifest stored as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Container format version
    pub format_version: String,
    /// Unique identifier of this container
    pub dataset_id: String,
    /// ISO 8601 creation timestamp
    pub created: String,
    /// Name and version of the writer
    pub converter: String,
    /// Number of cells (matrix rows)
    pub n_cells: u64,
    /// Number of genes (matrix columns)
    pub n_genes: u64,
    /// Stored matrix entries
    pub nnz: u64,
    /// Matrix encoding tag
    pub matrix_format: String,
    /// Bin type, when set
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bin_type: Option<String>,
    /// Grid bin size
    pub bin_size: u32,
}

impl Manifest {
    /// Manifest stamped with the current time, a fresh id, and this crate's
    /// version.
    pub fn new(
        n_cells: usize,
        n_genes: usize,
        nnz: usize,
        matrix_format: &str,
        bin_type: Option<&str>,
        bin_size: u32,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            dataset_id: uuid::Uuid::new_v4().to_string(),
            created: chrono::Utc::now().to_rfc3339(),
            converter: format!("stereo-exp v{}", env!("CARGO_PKG_VERSION")),
            n_cells: n_cells as u64,
            n_genes: n_genes as u64,
            nnz: nnz as u64,
            matrix_format: matrix_format.to_string(),
            bin_type: bin_type.map(str::to_string),
            bin_size,
        }
    }
}
