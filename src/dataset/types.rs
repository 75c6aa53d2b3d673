use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::binning::BinType;
use crate::matrix::{Count, ExpressionMatrix};
use crate::metadata::{CellTable, GeneTable};

use super::DatasetError;

/// Matrix axis, used to report which side a lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Rows
    Cells,
    /// Columns
    Genes,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Cells => "cell",
            Axis::Genes => "gene",
        })
    }
}

/// Input file formats understood by [`super::StereoExpData::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Delimited spot table
    Txt,
    /// Hierarchical `.stereo` container
    Container,
}

impl FileFormat {
    /// Canonical name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Txt => "txt",
            FileFormat::Container => "stereo",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
            .parse()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" | "tsv" | "csv" | "gem" => Ok(FileFormat::Txt),
            "stereo" | "container" => Ok(FileFormat::Container),
            other => Err(DatasetError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Components of a dataset before the shape invariants are checked.
///
/// Produced by ingestion and by the container reader, consumed by
/// [`super::StereoExpData::from_parts`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetParts {
    /// Cell-by-gene counts
    pub matrix: ExpressionMatrix,
    /// Row metadata
    pub cells: CellTable,
    /// Column metadata
    pub genes: GeneTable,
    /// Cell centers, one `[x, y]` per row
    pub position: Vec<[f64; 2]>,
    /// Binning strategy, if known
    pub bin_type: Option<BinType>,
    /// Grid bin size
    pub bin_size: u32,
}

/// Dense, labelled view of the expression matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTable {
    /// Row labels
    pub cell_names: Vec<String>,
    /// Column labels
    pub gene_names: Vec<String>,
    /// Row-major counts
    pub rows: Vec<Vec<Count>>,
}

impl ExpressionTable {
    /// `(n_cells, n_genes)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.cell_names.len(), self.gene_names.len())
    }

    /// Counts of one cell, by name.
    pub fn row(&self, cell: &str) -> Option<&[Count]> {
        let i = self.cell_names.iter().position(|c| c == cell)?;
        self.rows.get(i).map(Vec::as_slice)
    }

    /// Count at `(cell, gene)`, by name.
    pub fn value(&self, cell: &str, gene: &str) -> Option<Count> {
        let j = self.gene_names.iter().position(|g| g == gene)?;
        self.row(cell).and_then(|row| row.get(j).copied())
    }

    /// Write the table as delimited text with a header row.
    ///
    /// The first header cell is empty; the first column holds cell names.
    pub fn write_delimited<W: std::io::Write>(
        &self,
        writer: W,
        delimiter: u8,
    ) -> Result<(), DatasetError> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        out.write_record(std::iter::once("").chain(self.gene_names.iter().map(String::as_str)))?;
        for (name, row) in self.cell_names.iter().zip(&self.rows) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(name.clone());
            record.extend(row.iter().map(ToString::to_string));
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }
}
