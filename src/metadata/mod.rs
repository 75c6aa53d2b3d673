//! # Cell and Gene Metadata
//!
//! Each axis of the expression matrix has a metadata table: [`CellTable`]
//! for rows and [`GeneTable`] for columns. A table owns the axis names,
//! which define the index space, and a fixed set of optional attribute
//! columns aligned with those names.
//!
//! ## Attribute Columns
//!
//! | Table | Column | Filled by |
//! |-------|--------|-----------|
//! | cells | `total_counts` | [`CellTable::fill_qc`] |
//! | cells | `pct_counts_mt` | [`CellTable::fill_qc`] |
//! | cells | `n_genes_by_counts` | [`CellTable::fill_qc`] |
//! | cells | `cell_point` | cell-boundary ingestion |
//! | genes | `n_cells` | [`GeneTable::fill_qc`] |
//! | genes | `n_counts` | [`GeneTable::fill_qc`] |
//!
//! Every populated column has exactly one value per name. Subsetting slices
//! the names and all populated columns with the same selection.

mod cells;
mod error;
mod genes;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

pub use cells::{CellAttribute, CellTable};
pub use error::MetadataError;
pub use genes::{GeneAttribute, GeneTable};

/// Shared behavior of the cell and gene tables.
pub trait MetadataTable {
    /// Axis names, in index order.
    fn names(&self) -> &[String];

    /// Number of entries.
    fn len(&self) -> usize {
        self.names().len()
    }

    /// True when the table has no entries.
    fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    /// Index of `name` (exact match).
    fn position_of(&self, name: &str) -> Option<usize> {
        self.names().iter().position(|n| n == name)
    }

    /// Resolve every name to its index, failing on the first unknown name.
    fn positions_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, MetadataError>
    where
        Self: Sized,
    {
        let lookup: HashMap<&str, usize> = self
            .names()
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .rev()
            .collect();
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                lookup
                    .get(name)
                    .copied()
                    .ok_or_else(|| MetadataError::NameNotFound(name.to_string()))
            })
            .collect()
    }

    /// Check that every populated column matches the number of names.
    fn validate(&self) -> Result<(), MetadataError>;

    /// Keep only the entries in `index`, in that order. Duplicates are
    /// allowed. Nothing is modified if any index is out of bounds.
    fn sub_set(&mut self, index: &[usize]) -> Result<(), MetadataError>;

    /// Populated scalar columns as `(name, values)` pairs.
    fn scalar_columns(&self) -> Vec<(&'static str, &[f64])>;

    /// Store a scalar column by its on-disk name.
    fn set_scalar_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), MetadataError>;
}

pub(crate) fn check_index(index: &[usize], len: usize) -> Result<(), MetadataError> {
    match index.iter().find(|&&i| i >= len) {
        Some(&bad) => Err(MetadataError::IndexOutOfBounds { index: bad, len }),
        None => Ok(()),
    }
}

pub(crate) fn check_column<T>(
    column: &str,
    values: Option<&Vec<T>>,
    expected: usize,
) -> Result<(), MetadataError> {
    match values {
        Some(v) if v.len() != expected => Err(MetadataError::LengthMismatch {
            column: column.to_string(),
            expected,
            found: v.len(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn take<T: Clone>(values: &[T], index: &[usize]) -> Vec<T> {
    index.iter().map(|&i| values[i].clone()).collect()
}

pub(crate) fn take_column<T: Clone>(column: &mut Option<Vec<T>>, index: &[usize]) {
    if let Some(values) = column.as_mut() {
        *values = take(values, index);
    }
}
