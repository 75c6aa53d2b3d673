use std::fmt;
use std::str::FromStr;

use crate::geometry::Polygon;
use crate::matrix::ExpressionMatrix;

use super::{
    check_column, check_index, take, take_column, GeneTable, MetadataError, MetadataTable,
};

/// Scalar attribute columns of the cell table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellAttribute {
    /// Sum of counts per cell
    TotalCounts,
    /// Percent of counts in mitochondrial genes
    PctCountsMt,
    /// Number of genes with a non-zero count
    NGenesByCounts,
}

impl CellAttribute {
    /// All scalar cell attributes, in storage order.
    pub const ALL: [CellAttribute; 3] = [
        CellAttribute::TotalCounts,
        CellAttribute::PctCountsMt,
        CellAttribute::NGenesByCounts,
    ];

    /// Column name used on disk.
    pub const fn name(&self) -> &'static str {
        match self {
            CellAttribute::TotalCounts => "total_counts",
            CellAttribute::PctCountsMt => "pct_counts_mt",
            CellAttribute::NGenesByCounts => "n_genes_by_counts",
        }
    }
}

impl fmt::Display for CellAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellAttribute {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellAttribute::ALL
            .into_iter()
            .find(|attr| attr.name() == s)
            .ok_or_else(|| MetadataError::UnknownAttribute(s.to_string()))
    }
}

/// Row metadata: one entry per cell (or grid bin).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTable {
    names: Vec<String>,
    /// Sum of counts per cell
    pub total_counts: Option<Vec<f64>>,
    /// Percent of counts in genes prefixed `MT-`
    pub pct_counts_mt: Option<Vec<f64>>,
    /// Number of genes detected per cell
    pub n_genes_by_counts: Option<Vec<f64>>,
    /// Convex hull of each cell (cell-boundary datasets only)
    pub cell_point: Option<Vec<Polygon>>,
}

impl CellTable {
    /// Table with names and no attribute columns.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Attach cell boundaries, one polygon per name.
    pub fn with_cell_point(mut self, polygons: Vec<Polygon>) -> Self {
        self.cell_point = Some(polygons);
        self
    }

    /// Values of a scalar attribute, if populated.
    pub fn attribute(&self, attr: CellAttribute) -> Option<&[f64]> {
        match attr {
            CellAttribute::TotalCounts => self.total_counts.as_deref(),
            CellAttribute::PctCountsMt => self.pct_counts_mt.as_deref(),
            CellAttribute::NGenesByCounts => self.n_genes_by_counts.as_deref(),
        }
    }

    /// Replace a scalar attribute column.
    pub fn set_attribute(&mut self, attr: CellAttribute, values: Vec<f64>) {
        let slot = match attr {
            CellAttribute::TotalCounts => &mut self.total_counts,
            CellAttribute::PctCountsMt => &mut self.pct_counts_mt,
            CellAttribute::NGenesByCounts => &mut self.n_genes_by_counts,
        };
        *slot = Some(values);
    }

    /// Compute per-cell QC columns from the matrix.
    ///
    /// Mitochondrial genes are those whose name starts with `MT-`, ignoring
    /// case. Cells with no counts get a mitochondrial percentage of zero.
    pub fn fill_qc(
        &mut self,
        matrix: &ExpressionMatrix,
        genes: &GeneTable,
    ) -> Result<(), MetadataError> {
        let (n_rows, n_cols) = matrix.shape();
        if n_rows != self.len() {
            return Err(MetadataError::LengthMismatch {
                column: "matrix rows".to_string(),
                expected: self.len(),
                found: n_rows,
            });
        }
        if n_cols != genes.len() {
            return Err(MetadataError::LengthMismatch {
                column: "matrix columns".to_string(),
                expected: genes.len(),
                found: n_cols,
            });
        }

        let mt_genes: Vec<usize> = genes
            .names()
            .iter()
            .enumerate()
            .filter(|(_, name)| is_mitochondrial(name))
            .map(|(j, _)| j)
            .collect();

        let totals = matrix.row_sums()?;
        let mt_totals = matrix.select_cols(&mt_genes)?.row_sums()?;
        let pct = totals
            .iter()
            .zip(&mt_totals)
            .map(|(&total, &mt)| {
                if total == 0 {
                    0.0
                } else {
                    mt as f64 / total as f64 * 100.0
                }
            })
            .collect();

        self.total_counts = Some(totals.into_iter().map(|v| v as f64).collect());
        self.n_genes_by_counts = Some(matrix.row_nnz().into_iter().map(|v| v as f64).collect());
        self.pct_counts_mt = Some(pct);
        Ok(())
    }
}

fn is_mitochondrial(name: &str) -> bool {
    name.get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("mt-"))
}

impl MetadataTable for CellTable {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn validate(&self) -> Result<(), MetadataError> {
        let n = self.names.len();
        for attr in CellAttribute::ALL {
            match self.attribute(attr) {
                Some(values) if values.len() != n => {
                    return Err(MetadataError::LengthMismatch {
                        column: attr.name().to_string(),
                        expected: n,
                        found: values.len(),
                    })
                }
                _ => {}
            }
        }
        check_column("cell_point", self.cell_point.as_ref(), n)
    }

    fn sub_set(&mut self, index: &[usize]) -> Result<(), MetadataError> {
        check_index(index, self.names.len())?;
        self.validate()?;

        self.names = take(&self.names, index);
        take_column(&mut self.total_counts, index);
        take_column(&mut self.pct_counts_mt, index);
        take_column(&mut self.n_genes_by_counts, index);
        take_column(&mut self.cell_point, index);
        Ok(())
    }

    fn scalar_columns(&self) -> Vec<(&'static str, &[f64])> {
        CellAttribute::ALL
            .into_iter()
            .filter_map(|attr| self.attribute(attr).map(|values| (attr.name(), values)))
            .collect()
    }

    fn set_scalar_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), MetadataError> {
        let attr: CellAttribute = name.parse()?;
        self.set_attribute(attr, values);
        Ok(())
    }
}
