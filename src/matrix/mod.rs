//! # Expression Matrix
//!
//! Cell-by-gene count matrix with an explicit storage tag:
//!
//! | Variant | Layout | Encoding tag |
//! |---------|--------|--------------|
//! | [`ExpressionMatrix::Dense`] | row-major values | `array` |
//! | [`ExpressionMatrix::Csr`] | rows compressed | `csr_matrix` |
//! | [`ExpressionMatrix::Csc`] | columns compressed | `csc_matrix` |
//!
//! Rows are cells and columns are genes. Slicing keeps the storage tag;
//! conversions between tags are explicit (`to_dense`, `to_csr`, `to_csc`).

mod compressed;
mod error;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

pub use compressed::CompressedMatrix;
pub use error::MatrixError;

/// Element type of the expression matrix (UMI counts)
pub type Count = u64;

/// Storage tag of an [`ExpressionMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixFormat {
    /// Row-major dense array
    Dense,
    /// Compressed sparse rows
    Csr,
    /// Compressed sparse columns
    Csc,
}

impl MatrixFormat {
    /// Encoding tag written to containers.
    pub const fn encoding(&self) -> &'static str {
        match self {
            MatrixFormat::Dense => "array",
            MatrixFormat::Csr => "csr_matrix",
            MatrixFormat::Csc => "csc_matrix",
        }
    }

    /// True for the compressed variants.
    pub const fn is_sparse(&self) -> bool {
        !matches!(self, MatrixFormat::Dense)
    }
}

impl fmt::Display for MatrixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoding())
    }
}

impl FromStr for MatrixFormat {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" | "dense" => Ok(MatrixFormat::Dense),
            "csr_matrix" | "csr" => Ok(MatrixFormat::Csr),
            "csc_matrix" | "csc" => Ok(MatrixFormat::Csc),
            other => Err(MatrixError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Row-major dense count matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix {
    n_rows: usize,
    n_cols: usize,
    values: Vec<Count>,
}

impl DenseMatrix {
    /// Wrap row-major values; `values.len()` must equal `n_rows * n_cols`.
    pub fn new(n_rows: usize, n_cols: usize, values: Vec<Count>) -> Result<Self, MatrixError> {
        if n_rows.checked_mul(n_cols) != Some(values.len()) {
            return Err(MatrixError::ShapeMismatch(format!(
                "{} values for a {n_rows} x {n_cols} matrix",
                values.len()
            )));
        }
        Ok(Self {
            n_rows,
            n_cols,
            values,
        })
    }

    /// Build from nested rows; all rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Count>>) -> Result<Self, MatrixError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(MatrixError::ShapeMismatch(format!(
                "row {i} has {} columns, expected {n_cols}",
                row.len()
            )));
        }
        Ok(Self {
            n_rows,
            n_cols,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Row-major values.
    pub fn values(&self) -> &[Count] {
        &self.values
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[Count] {
        &self.values[i * self.n_cols..(i + 1) * self.n_cols]
    }

    fn select_rows(&self, index: &[usize]) -> Self {
        let mut values = Vec::with_capacity(index.len() * self.n_cols);
        for &i in index {
            values.extend_from_slice(self.row(i));
        }
        Self {
            n_rows: index.len(),
            n_cols: self.n_cols,
            values,
        }
    }

    fn select_cols(&self, index: &[usize]) -> Self {
        let mut values = Vec::with_capacity(self.n_rows * index.len());
        for i in 0..self.n_rows {
            let row = self.row(i);
            values.extend(index.iter().map(|&j| row[j]));
        }
        Self {
            n_rows: self.n_rows,
            n_cols: index.len(),
            values,
        }
    }

    fn to_compressed_rows(&self) -> CompressedMatrix {
        let mut indptr = Vec::with_capacity(self.n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for i in 0..self.n_rows {
            for (j, &v) in self.row(i).iter().enumerate() {
                if v != 0 {
                    indices.push(j);
                    data.push(v);
                }
            }
            indptr.push(data.len());
        }
        CompressedMatrix::from_lanes(self.n_rows, self.n_cols, indptr, indices, data)
    }
}

/// Cell-by-gene count matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionMatrix {
    /// Dense row-major storage
    Dense(DenseMatrix),
    /// Compressed sparse rows (lanes are cells)
    Csr(CompressedMatrix),
    /// Compressed sparse columns (lanes are genes)
    Csc(CompressedMatrix),
}

impl Default for ExpressionMatrix {
    fn default() -> Self {
        ExpressionMatrix::Csr(CompressedMatrix::empty(0, 0))
    }
}

impl ExpressionMatrix {
    /// Build a CSR matrix from `(row, col, value)` triplets.
    ///
    /// Repeated coordinates accumulate: two triplets `(r, c, 3)` and
    /// `(r, c, 4)` produce a single stored entry of 7.
    pub fn from_triplets(
        rows: &[usize],
        cols: &[usize],
        values: &[Count],
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self, MatrixError> {
        if rows.len() != cols.len() || cols.len() != values.len() {
            return Err(MatrixError::ShapeMismatch(format!(
                "triplet arrays differ in length: {} rows, {} cols, {} values",
                rows.len(),
                cols.len(),
                values.len()
            )));
        }
        check_bounds("row", rows, n_rows)?;
        check_bounds("column", cols, n_cols)?;
        Ok(ExpressionMatrix::Csr(CompressedMatrix::from_sorted_lanes(
            n_rows, n_cols, rows, cols, values,
        )?))
    }

    /// Wrap compressed arrays as CSR (`major` = rows) or CSC (`major` = columns).
    pub fn from_compressed(
        format: MatrixFormat,
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<Count>,
    ) -> Result<Self, MatrixError> {
        let (n_rows, n_cols) = shape;
        match format {
            MatrixFormat::Csr => Ok(ExpressionMatrix::Csr(CompressedMatrix::from_parts(
                n_rows, n_cols, indptr, indices, data,
            )?)),
            MatrixFormat::Csc => Ok(ExpressionMatrix::Csc(CompressedMatrix::from_parts(
                n_cols, n_rows, indptr, indices, data,
            )?)),
            MatrixFormat::Dense => Err(MatrixError::UnknownEncoding(
                "array is not a compressed encoding".to_string(),
            )),
        }
    }

    /// Storage tag.
    pub fn format(&self) -> MatrixFormat {
        match self {
            ExpressionMatrix::Dense(_) => MatrixFormat::Dense,
            ExpressionMatrix::Csr(_) => MatrixFormat::Csr,
            ExpressionMatrix::Csc(_) => MatrixFormat::Csc,
        }
    }

    /// True for CSR and CSC storage.
    pub fn is_sparse(&self) -> bool {
        self.format().is_sparse()
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            ExpressionMatrix::Dense(m) => (m.n_rows, m.n_cols),
            ExpressionMatrix::Csr(m) => (m.major_len(), m.minor_len()),
            ExpressionMatrix::Csc(m) => (m.minor_len(), m.major_len()),
        }
    }

    /// Number of rows (cells).
    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns (genes).
    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    /// Stored entries; for dense storage the number of non-zero values.
    pub fn nnz(&self) -> usize {
        match self {
            ExpressionMatrix::Dense(m) => m.values.iter().filter(|&&v| v != 0).count(),
            ExpressionMatrix::Csr(m) | ExpressionMatrix::Csc(m) => m.nnz(),
        }
    }

    /// Value at `(row, col)`. Panics if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Count {
        match self {
            ExpressionMatrix::Dense(m) => m.row(row)[col],
            ExpressionMatrix::Csr(m) => m.get(row, col),
            ExpressionMatrix::Csc(m) => m.get(col, row),
        }
    }

    /// Dense copy.
    pub fn to_dense(&self) -> ExpressionMatrix {
        let (n_rows, n_cols) = self.shape();
        let values = match self {
            ExpressionMatrix::Dense(m) => m.values.clone(),
            ExpressionMatrix::Csr(m) => m.to_dense_lanes(),
            ExpressionMatrix::Csc(m) => m.transposed().to_dense_lanes(),
        };
        ExpressionMatrix::Dense(DenseMatrix {
            n_rows,
            n_cols,
            values,
        })
    }

    /// CSR copy.
    pub fn to_csr(&self) -> ExpressionMatrix {
        match self {
            ExpressionMatrix::Dense(m) => ExpressionMatrix::Csr(m.to_compressed_rows()),
            ExpressionMatrix::Csr(m) => ExpressionMatrix::Csr(m.clone()),
            ExpressionMatrix::Csc(m) => ExpressionMatrix::Csr(m.transposed()),
        }
    }

    /// CSC copy.
    pub fn to_csc(&self) -> ExpressionMatrix {
        match self {
            ExpressionMatrix::Dense(m) => ExpressionMatrix::Csc(m.to_compressed_rows().transposed()),
            ExpressionMatrix::Csr(m) => ExpressionMatrix::Csc(m.transposed()),
            ExpressionMatrix::Csc(m) => ExpressionMatrix::Csc(m.clone()),
        }
    }

    /// Copy in the requested storage.
    pub fn to_format(&self, format: MatrixFormat) -> ExpressionMatrix {
        match format {
            MatrixFormat::Dense => self.to_dense(),
            MatrixFormat::Csr => self.to_csr(),
            MatrixFormat::Csc => self.to_csc(),
        }
    }

    /// Dense rows, densifying sparse storage on demand.
    pub fn dense_rows(&self) -> Vec<Vec<Count>> {
        let (n_rows, n_cols) = self.shape();
        let values = match self.to_dense() {
            ExpressionMatrix::Dense(m) => m.values,
            _ => Vec::new(),
        };
        if n_cols == 0 {
            return vec![Vec::new(); n_rows];
        }
        values.chunks(n_cols).map(<[Count]>::to_vec).collect()
    }

    /// Keep the rows in `index`, in order; duplicates allowed.
    pub fn select_rows(&self, index: &[usize]) -> Result<ExpressionMatrix, MatrixError> {
        check_bounds("row", index, self.n_rows())?;
        Ok(match self {
            ExpressionMatrix::Dense(m) => ExpressionMatrix::Dense(m.select_rows(index)),
            ExpressionMatrix::Csr(m) => ExpressionMatrix::Csr(m.select_major(index)),
            ExpressionMatrix::Csc(m) => ExpressionMatrix::Csc(m.select_minor(index)),
        })
    }

    /// Keep the columns in `index`, in order; duplicates allowed.
    pub fn select_cols(&self, index: &[usize]) -> Result<ExpressionMatrix, MatrixError> {
        check_bounds("column", index, self.n_cols())?;
        Ok(match self {
            ExpressionMatrix::Dense(m) => ExpressionMatrix::Dense(m.select_cols(index)),
            ExpressionMatrix::Csr(m) => ExpressionMatrix::Csr(m.select_minor(index)),
            ExpressionMatrix::Csc(m) => ExpressionMatrix::Csc(m.select_major(index)),
        })
    }

    /// Total counts per row. Fails when a total exceeds the count range.
    pub fn row_sums(&self) -> Result<Vec<Count>, MatrixError> {
        match self {
            ExpressionMatrix::Dense(m) => (0..m.n_rows)
                .map(|i| {
                    m.row(i)
                        .iter()
                        .try_fold(0 as Count, |acc, &v| acc.checked_add(v))
                        .ok_or(MatrixError::SumOverflow { lane: i })
                })
                .collect(),
            ExpressionMatrix::Csr(m) => m.major_sums(),
            ExpressionMatrix::Csc(m) => m.minor_sums(),
        }
    }

    /// Total counts per column. Fails when a total exceeds the count range.
    pub fn col_sums(&self) -> Result<Vec<Count>, MatrixError> {
        match self {
            ExpressionMatrix::Dense(m) => {
                let mut sums: Vec<Count> = vec![0; m.n_cols];
                for i in 0..m.n_rows {
                    for (j, (acc, &v)) in sums.iter_mut().zip(m.row(i)).enumerate() {
                        *acc = acc
                            .checked_add(v)
                            .ok_or(MatrixError::SumOverflow { lane: j })?;
                    }
                }
                Ok(sums)
            }
            ExpressionMatrix::Csr(m) => m.minor_sums(),
            ExpressionMatrix::Csc(m) => m.major_sums(),
        }
    }

    /// Non-zero entries per row.
    pub fn row_nnz(&self) -> Vec<usize> {
        match self {
            ExpressionMatrix::Dense(m) => (0..m.n_rows)
                .map(|i| m.row(i).iter().filter(|&&v| v != 0).count())
                .collect(),
            ExpressionMatrix::Csr(m) => m.major_nnz(),
            ExpressionMatrix::Csc(m) => m.minor_nnz(),
        }
    }

    /// Non-zero entries per column.
    pub fn col_nnz(&self) -> Vec<usize> {
        match self {
            ExpressionMatrix::Dense(m) => {
                let mut counts = vec![0; m.n_cols];
                for i in 0..m.n_rows {
                    for (acc, &v) in counts.iter_mut().zip(m.row(i)) {
                        if v != 0 {
                            *acc += 1;
                        }
                    }
                }
                counts
            }
            ExpressionMatrix::Csr(m) => m.minor_nnz(),
            ExpressionMatrix::Csc(m) => m.major_nnz(),
        }
    }
}

fn check_bounds(axis: &'static str, index: &[usize], len: usize) -> Result<(), MatrixError> {
    match index.iter().find(|&&i| i >= len) {
        Some(&bad) => Err(MatrixError::IndexOutOfBounds {
            axis,
            index: bad,
            len,
        }),
        None => Ok(()),
    }
}
