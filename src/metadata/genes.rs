use std::fmt;
use std::str::FromStr;

use crate::matrix::ExpressionMatrix;

use super::{check_column, check_index, take, take_column, MetadataError, MetadataTable};

/// Scalar attribute columns of the gene table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneAttribute {
    /// Number of cells expressing the gene
    NCells,
    /// Sum of counts per gene
    NCounts,
}

impl GeneAttribute {
    /// All scalar gene attributes, in storage order.
    pub const ALL: [GeneAttribute; 2] = [GeneAttribute::NCells, GeneAttribute::NCounts];

    /// Column name used on disk.
    pub const fn name(&self) -> &'static str {
        match self {
            GeneAttribute::NCells => "n_cells",
            GeneAttribute::NCounts => "n_counts",
        }
    }
}

impl fmt::Display for GeneAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneAttribute {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeneAttribute::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| MetadataError::UnknownAttribute(s.to_string()))
    }
}

/// Column metadata: one entry per gene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneTable {
    names: Vec<String>,
    /// Number of cells with a non-zero count
    pub n_cells: Option<Vec<f64>>,
    /// Sum of counts over all cells
    pub n_counts: Option<Vec<f64>>,
}

impl GeneTable {
    /// Table with names and no attribute columns.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Values of a scalar attribute, if populated.
    pub fn attribute(&self, attr: GeneAttribute) -> Option<&[f64]> {
        match attr {
            GeneAttribute::NCells => self.n_cells.as_deref(),
            GeneAttribute::NCounts => self.n_counts.as_deref(),
        }
    }

    /// Replace a scalar attribute column.
    pub fn set_attribute(&mut self, attr: GeneAttribute, values: Vec<f64>) {
        match attr {
            GeneAttribute::NCells => self.n_cells = Some(values),
            GeneAttribute::NCounts => self.n_counts = Some(values),
        }
    }

    /// Compute per-gene QC columns from the matrix.
    pub fn fill_qc(&mut self, matrix: &ExpressionMatrix) -> Result<(), MetadataError> {
        let n_cols = matrix.n_cols();
        if n_cols != self.len() {
            return Err(MetadataError::LengthMismatch {
                column: "matrix columns".to_string(),
                expected: self.len(),
                found: n_cols,
            });
        }
        self.n_cells = Some(matrix.col_nnz().into_iter().map(|v| v as f64).collect());
        self.n_counts = Some(matrix.col_sums()?.into_iter().map(|v| v as f64).collect());
        Ok(())
    }
}

impl MetadataTable for GeneTable {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn validate(&self) -> Result<(), MetadataError> {
        let n = self.names.len();
        check_column(GeneAttribute::NCells.name(), self.n_cells.as_ref(), n)?;
        check_column(GeneAttribute::NCounts.name(), self.n_counts.as_ref(), n)
    }

    fn sub_set(&mut self, index: &[usize]) -> Result<(), MetadataError> {
        check_index(index, self.names.len())?;
        self.validate()?;

        self.names = take(&self.names, index);
        take_column(&mut self.n_cells, index);
        take_column(&mut self.n_counts, index);
        Ok(())
    }

    fn scalar_columns(&self) -> Vec<(&'static str, &[f64])> {
        GeneAttribute::ALL
            .into_iter()
            .filter_map(|attr| self.attribute(attr).map(|values| (attr.name(), values)))
            .collect()
    }

    fn set_scalar_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), MetadataError> {
        let attr: GeneAttribute = name.parse()?;
        self.set_attribute(attr, values);
        Ok(())
    }
}
