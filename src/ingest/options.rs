use crate::binning::{BinType, DEFAULT_BIN_SIZE};

use super::IngestError;

/// Options controlling how a raw spot file is read and binned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Field separator (tab by default)
    pub separator: u8,

    /// Binning strategy; unset falls back to grid bins
    pub bin_type: Option<BinType>,

    /// Grid bin edge length (ignored for cell bins)
    pub bin_size: u32,

    /// Keep the matrix in CSR form; `false` densifies it
    pub sparse: bool,

    /// Lines starting with this byte are skipped
    pub comment: Option<u8>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            separator: b'\t',
            bin_type: None,
            bin_size: DEFAULT_BIN_SIZE,
            sparse: true,
            comment: Some(b'#'),
        }
    }
}

impl IngestOptions {
    /// Default options: tab separated, grid bins of 100, sparse output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field separator.
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Set the binning strategy.
    pub fn with_bin_type(mut self, bin_type: BinType) -> Self {
        self.bin_type = Some(bin_type);
        self
    }

    /// Set the grid bin size.
    pub fn with_bin_size(mut self, bin_size: u32) -> Self {
        self.bin_size = bin_size;
        self
    }

    /// Choose sparse (CSR) or dense output.
    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    /// Set or clear the comment marker.
    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    /// Binning strategy actually applied.
    pub fn effective_bin_type(&self) -> BinType {
        self.bin_type.unwrap_or(BinType::Bins)
    }

    /// Check option consistency.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.bin_size == 0 {
            return Err(IngestError::InvalidOptions(
                "bin_size must be positive".to_string(),
            ));
        }
        if self.comment == Some(self.separator) {
            return Err(IngestError::InvalidOptions(
                "comment marker and separator must differ".to_string(),
            ));
        }
        Ok(())
    }
}
