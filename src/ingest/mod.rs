//! # Raw Spot Ingestion
//!
//! Reads a delimited spot table (one row per detected transcript location)
//! and assembles the parts of a dataset:
//!
//! ```text
//! x  y  geneID  UMICount  [label]
//!        │
//!        ▼  clean (drop rows with missing values)
//!        ▼  bin (grid squares or labelled cell boundaries)
//!        ▼  intern genes, accumulate counts per (cell, gene)
//! CSR matrix + cell names + gene names + positions
//! ```
//!
//! Cells and genes are numbered in the order they first appear in the file.
//! Repeated `(cell, gene)` pairs are summed.

mod error;
mod options;
mod records;


use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::binning::{binner_for, BinType};
use crate::dataset::DatasetParts;
use crate::diagnostics::DiagnosticsSink;
use crate::matrix::ExpressionMatrix;
use crate::metadata::CellTable;
use crate::metadata::GeneTable;

pub use error::IngestError;
pub use options::IngestOptions;
pub use records::{COL_CELL_ID, COL_COUNT, COL_GENE, COL_LABEL, COL_X, COL_Y};

/// Ingest a spot table from disk.
pub fn ingest_path<P: AsRef<Path>>(
    path: P,
    options: &IngestOptions,
    sink: &dyn DiagnosticsSink,
) -> Result<DatasetParts, IngestError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IngestError::MissingFile(path.to_path_buf()));
    }
    sink.debug(&format!("reading spots from {}", path.display()));
    let file = File::open(path)?;
    ingest_reader(BufReader::new(file), options, sink)
}

/// Ingest a spot table from any reader.
pub fn ingest_reader<R: Read>(
    reader: R,
    options: &IngestOptions,
    sink: &dyn DiagnosticsSink,
) -> Result<DatasetParts, IngestError> {
    options.validate()?;

    let spots = records::read_spots(reader, options, sink)?;
    if spots.is_empty() {
        return Err(IngestError::Empty);
    }
    sink.debug(&format!("read {} spots", spots.len()));

    let bin_type = options.effective_bin_type();
    let binner = binner_for(bin_type, options.bin_size)?;
    let assignment = binner.bin(&spots.xs, &spots.ys, spots.labels.as_deref())?;

    let n_cells = assignment.n_cells();
    let n_genes = spots.gene_names.len();
    sink.info(&format!(
        "the matrix has {n_cells} cells, and {n_genes} genes."
    ));

    let matrix = ExpressionMatrix::from_triplets(
        &assignment.point_cells,
        &spots.gene_index,
        &spots.counts,
        n_cells,
        n_genes,
    )?;
    let matrix = if options.sparse {
        matrix
    } else {
        matrix.to_dense()
    };

    let position = assignment.centers();
    let mut cells = CellTable::new(assignment.cell_ids());
    if bin_type == BinType::CellBins {
        let polygons = assignment
            .cells
            .into_iter()
            .map(|cell| cell.boundary.unwrap_or_default())
            .collect();
        cells = cells.with_cell_point(polygons);
    }

    Ok(DatasetParts {
        matrix,
        cells,
        genes: GeneTable::new(spots.gene_names),
        position,
        bin_type: options.bin_type,
        bin_size: options.bin_size,
    })
}
