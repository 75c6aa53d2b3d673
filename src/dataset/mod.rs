//! # Spatial Expression Dataset
//!
//! [`StereoExpData`] ties together the count matrix, the cell and gene
//! metadata, and the spatial position of every cell:
//!
//! ```text
//!              genes (n_genes)
//!            ┌──────────────────┐
//!  cells     │                  │  position[i] = [x, y] of cell i
//!  (n_cells) │  ExpressionMatrix│  cells.names[i]       = row label
//!            │                  │  genes.names[j]       = column label
//!            └──────────────────┘
//! ```
//!
//! The shape invariant `matrix rows == cells == positions` and
//! `matrix columns == genes` holds for every value returned by this module.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stereo_exp::prelude::*;
//!
//! let mut data = StereoExpData::new()
//!     .with_file("spots.tsv", Some(FileFormat::Txt))
//!     .with_output("spots.stereo")
//!     .with_bin_size(50);
//! let sink = LogSink::new("convert");
//! data.read(&IngestOptions::new(), &sink)?;
//! data.subset_in_place(Some(&[0, 2, 4][..]), None)?;
//! data.write(&ContainerConfig::default(), &sink)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod types;


use std::path::{Path, PathBuf};

use crate::binning::{BinType, DEFAULT_BIN_SIZE};
use crate::container::{read_container, ContainerConfig, ContainerWriter, WriteStats};
use crate::diagnostics::DiagnosticsSink;
use crate::ingest::{ingest_path, IngestOptions};
use crate::matrix::{Count, ExpressionMatrix};
use crate::metadata::{CellTable, GeneTable, MetadataError, MetadataTable};

pub use error::DatasetError;
pub use types::{Axis, DatasetParts, ExpressionTable, FileFormat};

/// A spatially resolved gene-expression dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoExpData {
    matrix: ExpressionMatrix,
    cells: CellTable,
    genes: GeneTable,
    position: Vec<[f64; 2]>,
    bin_type: Option<BinType>,
    bin_size: u32,
    file_path: Option<PathBuf>,
    file_format: Option<FileFormat>,
    output: Option<PathBuf>,
    partitions: usize,
}

impl Default for StereoExpData {
    fn default() -> Self {
        Self {
            matrix: ExpressionMatrix::default(),
            cells: CellTable::default(),
            genes: GeneTable::default(),
            position: Vec::new(),
            bin_type: None,
            bin_size: DEFAULT_BIN_SIZE,
            file_path: None,
            file_format: None,
            output: None,
            partitions: 1,
        }
    }
}

impl StereoExpData {
    /// Empty dataset with default settings (`bin_size` 100, one partition).
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a dataset, checking the shape invariants.
    pub fn from_parts(parts: DatasetParts) -> Result<Self, DatasetError> {
        let data = Self {
            matrix: parts.matrix,
            cells: parts.cells,
            genes: parts.genes,
            position: parts.position,
            bin_type: parts.bin_type,
            bin_size: parts.bin_size,
            ..Self::default()
        };
        data.check_structure()?;
        Ok(data)
    }

    /// Set the input file. With no format, it is inferred from the extension
    /// when reading.
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P, format: Option<FileFormat>) -> Self {
        self.file_path = Some(path.into());
        self.file_format = format;
        self
    }

    /// Set the container path used by [`StereoExpData::write`].
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set the bin type.
    pub fn with_bin_type(mut self, bin_type: BinType) -> Self {
        self.bin_type = Some(bin_type);
        self
    }

    /// Set the grid bin size.
    pub fn with_bin_size(mut self, bin_size: u32) -> Self {
        self.bin_size = bin_size;
        self
    }

    /// Number of ingestion partitions. Stored and reported, not used.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Count matrix.
    pub fn matrix(&self) -> &ExpressionMatrix {
        &self.matrix
    }

    /// Row metadata.
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    /// Mutable row metadata. Attribute columns must keep one value per cell.
    pub fn cells_mut(&mut self) -> &mut CellTable {
        &mut self.cells
    }

    /// Column metadata.
    pub fn genes(&self) -> &GeneTable {
        &self.genes
    }

    /// Mutable column metadata. Attribute columns must keep one value per gene.
    pub fn genes_mut(&mut self) -> &mut GeneTable {
        &mut self.genes
    }

    /// Cell centers, one `[x, y]` per row.
    pub fn position(&self) -> &[[f64; 2]] {
        &self.position
    }

    /// Cell names in row order.
    pub fn cell_names(&self) -> &[String] {
        self.cells.names()
    }

    /// Gene names in column order.
    pub fn gene_names(&self) -> &[String] {
        self.genes.names()
    }

    /// Binning strategy, if set.
    pub fn bin_type(&self) -> Option<BinType> {
        self.bin_type
    }

    /// Set or clear the binning strategy.
    pub fn set_bin_type(&mut self, bin_type: Option<BinType>) {
        self.bin_type = bin_type;
    }

    /// Set the binning strategy from its string form.
    pub fn set_bin_type_str(&mut self, value: &str) -> Result<(), DatasetError> {
        self.bin_type = BinType::check(Some(value))?;
        Ok(())
    }

    /// Grid bin size.
    pub fn bin_size(&self) -> u32 {
        self.bin_size
    }

    /// Input file, if set.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Input format, if set.
    pub fn file_format(&self) -> Option<FileFormat> {
        self.file_format
    }

    /// Output path, if set.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Configured partition count.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// `(n_cells, n_genes)`.
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.matrix.n_rows()
    }

    /// Number of genes.
    pub fn n_genes(&self) -> usize {
        self.matrix.n_cols()
    }

    /// Total counts per cell, in row order.
    pub fn row_intensity(&self) -> Result<Vec<Count>, DatasetError> {
        Ok(self.matrix.row_sums()?)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check the configured input file and the shape invariants.
    pub fn check(&self) -> Result<(), DatasetError> {
        if let Some(path) = &self.file_path {
            if !path.exists() {
                return Err(DatasetError::MissingFile(path.clone()));
            }
        }
        self.check_contents()
    }

    /// Everything [`StereoExpData::check`] covers except the input file.
    fn check_contents(&self) -> Result<(), DatasetError> {
        if self.bin_size == 0 {
            return Err(DatasetError::Validation(
                "bin size must be positive".to_string(),
            ));
        }
        self.check_structure()
    }

    fn check_structure(&self) -> Result<(), DatasetError> {
        let (n_rows, n_cols) = self.matrix.shape();
        if n_rows != self.cells.len() {
            return Err(DatasetError::Validation(format!(
                "matrix has {n_rows} rows but {} cells",
                self.cells.len()
            )));
        }
        if n_rows != self.position.len() {
            return Err(DatasetError::Validation(format!(
                "matrix has {n_rows} rows but {} positions",
                self.position.len()
            )));
        }
        if n_cols != self.genes.len() {
            return Err(DatasetError::Validation(format!(
                "matrix has {n_cols} columns but {} genes",
                self.genes.len()
            )));
        }
        self.cells.validate()?;
        self.genes.validate()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subsetting
    // ------------------------------------------------------------------

    /// Restrict the dataset to the given cell and gene indices, in place.
    ///
    /// `None` keeps an axis whole. Indices may repeat and appear in any
    /// order. Every index is checked before anything is modified.
    pub fn subset_in_place(
        &mut self,
        cell_index: Option<&[usize]>,
        gene_index: Option<&[usize]>,
    ) -> Result<&mut Self, DatasetError> {
        self.check_structure()?;
        let (n_rows, n_cols) = self.matrix.shape();
        if let Some(index) = cell_index {
            check_index(Axis::Cells, index, n_rows)?;
        }
        if let Some(index) = gene_index {
            check_index(Axis::Genes, index, n_cols)?;
        }

        if let Some(index) = cell_index {
            self.matrix = self.matrix.select_rows(index)?;
            self.cells.sub_set(index)?;
            self.position = index.iter().map(|&i| self.position[i]).collect();
        }
        if let Some(index) = gene_index {
            self.matrix = self.matrix.select_cols(index)?;
            self.genes.sub_set(index)?;
        }
        Ok(self)
    }

    /// Copy of the dataset restricted to the given indices.
    pub fn subset_to_new_copy(
        &self,
        cell_index: Option<&[usize]>,
        gene_index: Option<&[usize]>,
    ) -> Result<Self, DatasetError> {
        let mut copy = self.clone();
        copy.subset_in_place(cell_index, gene_index)?;
        Ok(copy)
    }

    /// Copy of the dataset restricted to the given names (exact match).
    ///
    /// The receiver is never modified.
    pub fn subset_by_name(
        &self,
        cell_names: Option<&[&str]>,
        gene_names: Option<&[&str]>,
    ) -> Result<Self, DatasetError> {
        let cell_index = cell_names
            .map(|names| resolve(&self.cells, Axis::Cells, names))
            .transpose()?;
        let gene_index = gene_names
            .map(|names| resolve(&self.genes, Axis::Genes, names))
            .transpose()?;
        self.subset_to_new_copy(cell_index.as_deref(), gene_index.as_deref())
    }

    // ------------------------------------------------------------------
    // Tables and QC
    // ------------------------------------------------------------------

    /// Dense table labelled by cell and gene names.
    pub fn as_table(&self) -> ExpressionTable {
        ExpressionTable {
            cell_names: self.cells.names().to_vec(),
            gene_names: self.genes.names().to_vec(),
            rows: self.matrix.dense_rows(),
        }
    }

    /// Dense table of a name-selected part of the dataset.
    pub fn expression_table(
        &self,
        cell_names: Option<&[&str]>,
        gene_names: Option<&[&str]>,
    ) -> Result<ExpressionTable, DatasetError> {
        Ok(self.subset_by_name(cell_names, gene_names)?.as_table())
    }

    /// Fill the per-cell and per-gene QC columns from the matrix.
    pub fn fill_qc(&mut self) -> Result<&mut Self, DatasetError> {
        self.cells.fill_qc(&self.matrix, &self.genes)?;
        self.genes.fill_qc(&self.matrix)?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // I/O
    // ------------------------------------------------------------------

    /// Load the configured input file, replacing the current contents.
    ///
    /// Spot tables go through ingestion with `options`. The dataset's own
    /// bin size always replaces `options.bin_size`, and its bin type, when
    /// set, replaces `options.bin_type`. Containers ignore `options`.
    pub fn read(
        &mut self,
        options: &IngestOptions,
        sink: &dyn DiagnosticsSink,
    ) -> Result<&mut Self, DatasetError> {
        self.check()?;
        let path = self
            .file_path
            .clone()
            .ok_or_else(|| DatasetError::Validation("no input file set".to_string()))?;
        let format = match self.file_format {
            Some(format) => format,
            None => FileFormat::from_path(&path)?,
        };

        let parts = match format {
            FileFormat::Txt => {
                let mut options = options.clone();
                options.bin_size = self.bin_size;
                if self.bin_type.is_some() {
                    options.bin_type = self.bin_type;
                }
                ingest_path(&path, &options, sink)?
            }
            FileFormat::Container => read_container(&path, sink)?,
        };

        let loaded = Self::from_parts(parts)?;
        self.matrix = loaded.matrix;
        self.cells = loaded.cells;
        self.genes = loaded.genes;
        self.position = loaded.position;
        self.bin_type = loaded.bin_type;
        self.bin_size = loaded.bin_size;
        self.file_format = Some(format);
        Ok(self)
    }

    /// Persist the dataset to the configured output path.
    pub fn write(
        &self,
        config: &ContainerConfig,
        sink: &dyn DiagnosticsSink,
    ) -> Result<WriteStats, DatasetError> {
        let output = self.output.as_deref().ok_or(DatasetError::OutputPath)?;
        self.check_contents()?;
        Ok(ContainerWriter::new(config.clone()).write(Some(output), self, sink)?)
    }
}

fn check_index(axis: Axis, index: &[usize], len: usize) -> Result<(), DatasetError> {
    match index.iter().find(|&&i| i >= len) {
        Some(bad) => Err(DatasetError::Validation(format!(
            "{axis} index {bad} out of range for {len} {axis}s"
        ))),
        None => Ok(()),
    }
}

fn resolve<T: MetadataTable>(
    table: &T,
    axis: Axis,
    names: &[&str],
) -> Result<Vec<usize>, DatasetError> {
    table.positions_of(names).map_err(|err| match err {
        MetadataError::NameNotFound(name) => DatasetError::Key { axis, name },
        other => other.into(),
    })
}
