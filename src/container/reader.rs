use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use zip::ZipArchive;

use crate::binning::{BinType, DEFAULT_BIN_SIZE};
use crate::dataset::DatasetParts;
use crate::diagnostics::DiagnosticsSink;
use crate::geometry::{Point, Polygon};
use crate::matrix::{DenseMatrix, ExpressionMatrix, MatrixFormat};
use crate::metadata::{CellTable, GeneTable, MetadataError, MetadataTable};

use super::layout::{GroupDescriptor, Manifest};
use super::{dataset_path, descriptor_path, entries, ContainerError, Dataset, STEREO_MIMETYPE};

/// Load a container into dataset parts.
///
/// Top-level entries are dispatched by name; unknown names are skipped with
/// a debug message.
pub fn read_container<P: AsRef<Path>>(
    path: P,
    sink: &dyn DiagnosticsSink,
) -> Result<DatasetParts, ContainerError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ContainerError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mut archive = ContainerArchive::new(ZipArchive::new(BufReader::new(file))?);

    let mut matrix = None;
    let mut cells = None;
    let mut genes = None;
    let mut position = None;
    let mut bin_type = None;
    let mut bin_size = DEFAULT_BIN_SIZE;

    archive.check_mimetype()?;
    for name in archive.top_level_names() {
        match name.as_str() {
            entries::MIMETYPE => {}
            entries::MANIFEST => {
                let manifest: Manifest = archive.read_json(entries::MANIFEST)?;
                sink.debug(&format!(
                    "container {} written by {} at {}",
                    manifest.dataset_id, manifest.converter, manifest.created
                ));
            }
            entries::CELLS => cells = Some(archive.read_cells(sink)?),
            entries::GENES => genes = Some(archive.read_genes(sink)?),
            entries::POSITION => position = Some(archive.read_position()?),
            entries::BIN_TYPE => {
                let value = archive
                    .read_dataset(entries::BIN_TYPE)?
                    .into_strings(entries::BIN_TYPE)?;
                bin_type = match value.first() {
                    Some(s) => Some(s.parse::<BinType>()?),
                    None => None,
                };
            }
            entries::BIN_SIZE => {
                let value = archive
                    .read_dataset(entries::BIN_SIZE)?
                    .into_i64(entries::BIN_SIZE)?;
                if let Some(&v) = value.first() {
                    bin_size = u32::try_from(v).map_err(|_| {
                        ContainerError::InvalidFormat(format!("bin_size {v} out of range"))
                    })?;
                }
            }
            entries::EXP_MATRIX => matrix = Some(archive.read_matrix()?),
            other => sink.debug(&format!("ignoring unknown container entry `{other}`")),
        }
    }

    let missing = |what: &str| ContainerError::InvalidFormat(format!("container has no `{what}`"));
    let parts = DatasetParts {
        matrix: matrix.ok_or_else(|| missing(entries::EXP_MATRIX))?,
        cells: cells.ok_or_else(|| missing(entries::CELLS))?,
        genes: genes.ok_or_else(|| missing(entries::GENES))?,
        position: position.ok_or_else(|| missing(entries::POSITION))?,
        bin_type,
        bin_size,
    };
    sink.info(&format!(
        "the matrix has {} cells, and {} genes.",
        parts.matrix.n_rows(),
        parts.matrix.n_cols()
    ));
    Ok(parts)
}

/// One ZIP entry as listed in the central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry path
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Compressed size in bytes
    pub compressed_size: u64,
    /// True when the entry is Stored
    pub stored: bool,
}

/// Lightweight description of a container, read without decoding datasets
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    /// Container path
    pub path: PathBuf,
    /// Container size in bytes
    pub file_size: u64,
    /// Parsed manifest, if present and valid
    pub manifest: Option<Manifest>,
    /// All entries in archive order
    pub entries: Vec<EntryInfo>,
}

impl ContainerSummary {
    /// Number of Parquet datasets.
    pub fn dataset_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.name.ends_with(".parquet"))
            .count()
    }
}

/// Describe a container from its manifest and central directory.
pub fn summarize<P: AsRef<Path>>(path: P) -> Result<ContainerSummary, ContainerError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ContainerError::MissingFile(path.to_path_buf()));
    }
    let file_size = std::fs::metadata(path)?.len();
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;

    let mut listing = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index_raw(i)?;
        listing.push(EntryInfo {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            stored: entry.compression() == zip::CompressionMethod::Stored,
        });
    }

    let mut archive = ContainerArchive::new(zip);
    let manifest = archive.read_json::<Manifest>(entries::MANIFEST).ok();

    Ok(ContainerSummary {
        path: path.to_path_buf(),
        file_size,
        manifest,
        entries: listing,
    })
}

/// ZIP archive wrapper that decodes container entries.
pub(super) struct ContainerArchive<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> ContainerArchive<R> {
    pub(super) fn new(zip: ZipArchive<R>) -> Self {
        Self { zip }
    }

    /// Distinct first path components, `.parquet` stripped, sorted.
    pub(super) fn top_level_names(&self) -> BTreeSet<String> {
        self.zip
            .file_names()
            .filter_map(|name| name.split('/').next())
            .map(|first| first.strip_suffix(".parquet").unwrap_or(first).to_string())
            .collect()
    }

    pub(super) fn has_entry(&self, path: &str) -> bool {
        self.zip.index_for_name(path).is_some()
    }

    pub(super) fn read_bytes(&mut self, path: &str) -> Result<Bytes, ContainerError> {
        let mut entry = self.zip.by_name(path).map_err(|_| {
            ContainerError::InvalidFormat(format!("missing entry `{path}`"))
        })?;
        let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut buffer)?;
        Ok(Bytes::from(buffer))
    }

    pub(super) fn read_json<T: serde::de::DeserializeOwned>(
        &mut self,
        path: &str,
    ) -> Result<T, ContainerError> {
        let bytes = self.read_bytes(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(super) fn read_dataset(&mut self, path: &str) -> Result<Dataset, ContainerError> {
        let bytes = self.read_bytes(&dataset_path(path))?;
        Dataset::decode(bytes)
    }

    pub(super) fn read_descriptor(&mut self, group: &str) -> Result<GroupDescriptor, ContainerError> {
        self.read_json(&descriptor_path(group))
    }

    pub(super) fn check_mimetype(&mut self) -> Result<(), ContainerError> {
        let bytes = self.read_bytes(entries::MIMETYPE)?;
        if bytes.as_ref() != STEREO_MIMETYPE.as_bytes() {
            return Err(ContainerError::InvalidFormat(format!(
                "unexpected mimetype `{}`",
                String::from_utf8_lossy(&bytes)
            )));
        }
        Ok(())
    }

    fn read_cells(&mut self, sink: &dyn DiagnosticsSink) -> Result<CellTable, ContainerError> {
        let descriptor = self.read_descriptor(entries::CELLS)?;
        let names = self.read_names(entries::CELLS, entries::CELL_NAME)?;
        let mut table = CellTable::new(names);

        for member in &descriptor.members {
            match member.as_str() {
                entries::CELL_NAME => {}
                entries::CELL_POINT => {
                    let group = format!("{}/{}", entries::CELLS, entries::CELL_POINT);
                    table.cell_point = Some(self.read_polygons(&group)?);
                }
                name => self.read_scalar_member(&mut table, entries::CELLS, name, sink)?,
            }
        }
        table.validate()?;
        Ok(table)
    }

    fn read_genes(&mut self, sink: &dyn DiagnosticsSink) -> Result<GeneTable, ContainerError> {
        let descriptor = self.read_descriptor(entries::GENES)?;
        let names = self.read_names(entries::GENES, entries::GENE_NAME)?;
        let mut table = GeneTable::new(names);

        for member in &descriptor.members {
            if member != entries::GENE_NAME {
                self.read_scalar_member(&mut table, entries::GENES, member, sink)?;
            }
        }
        table.validate()?;
        Ok(table)
    }

    fn read_names(&mut self, group: &str, member: &str) -> Result<Vec<String>, ContainerError> {
        let path = format!("{group}/{member}");
        self.read_dataset(&path)?.into_strings(&path)
    }

    fn read_scalar_member<T: MetadataTable>(
        &mut self,
        table: &mut T,
        group: &str,
        name: &str,
        sink: &dyn DiagnosticsSink,
    ) -> Result<(), ContainerError> {
        let path = format!("{group}/{name}");
        let values = self.read_dataset(&path)?.into_f64(&path)?;
        match table.set_scalar_column(name, values) {
            Ok(()) => Ok(()),
            Err(MetadataError::UnknownAttribute(_)) => {
                sink.debug(&format!("ignoring unknown attribute `{path}`"));
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn read_polygons(&mut self, group: &str) -> Result<Vec<Polygon>, ContainerError> {
        let offsets = self
            .read_dataset(&format!("{group}/offsets"))?
            .into_indices("cell_point offsets")?;
        let coords = self.read_dataset(&format!("{group}/coords"))?;
        let coords = coords.into_f64("cell_point coords")?;

        let n_vertices = coords.len() / 2;
        let valid = coords.len() % 2 == 0
            && offsets.first() == Some(&0)
            && offsets.last() == Some(&n_vertices)
            && offsets.windows(2).all(|w| w[0] <= w[1]);
        if !valid {
            return Err(ContainerError::InvalidFormat(
                "cell_point offsets do not match coordinates".to_string(),
            ));
        }

        let points: Vec<Point> = coords
            .chunks_exact(2)
            .map(|xy| Point::new(xy[0], xy[1]))
            .collect();
        Ok(offsets
            .windows(2)
            .map(|w| Polygon::new(points[w[0]..w[1]].to_vec()))
            .collect())
    }

    fn read_position(&mut self) -> Result<Vec<[f64; 2]>, ContainerError> {
        let dataset = self.read_dataset(entries::POSITION)?;
        if dataset.shape.len() != 2 || dataset.shape[1] != 2 {
            return Err(ContainerError::InvalidFormat(format!(
                "position must have shape (n, 2), found {:?}",
                dataset.shape
            )));
        }
        let coords = dataset.into_f64(entries::POSITION)?;
        Ok(coords.chunks_exact(2).map(|xy| [xy[0], xy[1]]).collect())
    }

    fn read_matrix(&mut self) -> Result<ExpressionMatrix, ContainerError> {
        let dense_path = dataset_path(entries::EXP_MATRIX);
        if self.has_entry(&dense_path) {
            let dataset = self.read_dataset(entries::EXP_MATRIX)?;
            let (n_rows, n_cols) = match dataset.shape.as_slice() {
                &[r, c] => (r, c),
                other => {
                    return Err(ContainerError::InvalidFormat(format!(
                        "dense exp_matrix must be two-dimensional, found {other:?}"
                    )))
                }
            };
            let values = dataset.into_u64(entries::EXP_MATRIX)?;
            return Ok(ExpressionMatrix::Dense(DenseMatrix::new(n_rows, n_cols, values)?));
        }

        let group = entries::EXP_MATRIX;
        let descriptor = self.read_descriptor(group)?;
        let format: MatrixFormat = descriptor.encoding_type.parse()?;
        let shape = match descriptor.shape.as_slice() {
            &[r, c] => (r, c),
            other => {
                return Err(ContainerError::InvalidFormat(format!(
                    "exp_matrix shape must be two-dimensional, found {other:?}"
                )))
            }
        };
        let data = self
            .read_dataset(&format!("{group}/data"))?
            .into_u64("exp_matrix data")?;
        let indices = self
            .read_dataset(&format!("{group}/indices"))?
            .into_indices("exp_matrix indices")?;
        let indptr = self
            .read_dataset(&format!("{group}/indptr"))?
            .into_indices("exp_matrix indptr")?;
        Ok(ExpressionMatrix::from_compressed(
            format, shape, indptr, indices, data,
        )?)
    }
}
