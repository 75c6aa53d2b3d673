use std::fs;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::dataset::StereoExpData;
use crate::diagnostics::DiagnosticsSink;
use crate::geometry::Polygon;
use crate::matrix::{CompressedMatrix, ExpressionMatrix, MatrixFormat};
use crate::metadata::MetadataTable;

use super::layout::{GroupDescriptor, Manifest, ENCODING_DATAFRAME, ENCODING_POLYGONS};
use super::{
    dataset_path, descriptor_path, entries, ArrayData, ContainerConfig, ContainerError, Dataset,
    STEREO_MIMETYPE,
};

/// Summary of a completed container write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStats {
    /// Number of ZIP entries written
    pub entries_written: usize,
    /// Number of Parquet datasets among them
    pub datasets_written: usize,
    /// Matrix rows
    pub n_cells: usize,
    /// Matrix columns
    pub n_genes: usize,
    /// Stored matrix entries
    pub nnz: usize,
    /// Size of the finished container
    pub total_size_bytes: u64,
}

/// Writer for `.stereo` containers
#[derive(Debug, Clone, Default)]
pub struct ContainerWriter {
    config: ContainerConfig,
}

impl ContainerWriter {
    /// Create a writer with the given Parquet settings.
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// Parquet settings in use.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Write `data` to `destination`, replacing any existing file.
    ///
    /// The archive is assembled in a temporary file in the destination
    /// directory and renamed into place on success. On failure nothing is
    /// left at `destination`.
    pub fn write(
        &self,
        destination: Option<&Path>,
        data: &StereoExpData,
        sink: &dyn DiagnosticsSink,
    ) -> Result<WriteStats, ContainerError> {
        let destination = destination.ok_or(ContainerError::OutputPath)?;
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let temp = NamedTempFile::new_in(dir)?;
        let mut archive = ArchiveBuilder::new(BufWriter::new(temp), &self.config)?;
        write_dataset(&mut archive, data)?;
        let (entries_written, datasets_written, inner) = archive.finish()?;

        let temp = inner
            .into_inner()
            .map_err(|e| ContainerError::Io(e.into_error()))?;
        temp.as_file().sync_all()?;
        temp.persist(destination).map_err(|e| ContainerError::Io(e.error))?;

        let total_size_bytes = fs::metadata(destination)?.len();
        sink.info(&format!(
            "wrote {} ({} cells, {} genes, {} bytes)",
            destination.display(),
            data.n_cells(),
            data.n_genes(),
            total_size_bytes
        ));

        Ok(WriteStats {
            entries_written,
            datasets_written,
            n_cells: data.n_cells(),
            n_genes: data.n_genes(),
            nnz: data.matrix().nnz(),
            total_size_bytes,
        })
    }
}

fn write_dataset<W: Write + Seek>(
    archive: &mut ArchiveBuilder<'_, W>,
    data: &StereoExpData,
) -> Result<(), ContainerError> {
    let matrix = data.matrix();
    let manifest = Manifest::new(
        data.n_cells(),
        data.n_genes(),
        matrix.nnz(),
        matrix.format().encoding(),
        data.bin_type().map(|b| b.as_str()),
        data.bin_size(),
    );
    archive.add_json(entries::MANIFEST, &manifest)?;

    write_table(
        archive,
        entries::CELLS,
        entries::CELL_NAME,
        data.cells(),
        data.cells().cell_point.as_deref(),
    )?;
    write_table(archive, entries::GENES, entries::GENE_NAME, data.genes(), None)?;

    let coords: Vec<f64> = data.position().iter().flatten().copied().collect();
    archive.add_dataset(
        entries::POSITION,
        &Dataset::with_shape(ArrayData::Float64(coords), vec![data.n_cells(), 2])?,
    )?;

    if let Some(bin_type) = data.bin_type() {
        archive.add_dataset(
            entries::BIN_TYPE,
            &Dataset::scalar(ArrayData::Utf8(vec![bin_type.as_str().to_string()]))?,
        )?;
    }
    archive.add_dataset(
        entries::BIN_SIZE,
        &Dataset::scalar(ArrayData::Int64(vec![i64::from(data.bin_size())]))?,
    )?;

    write_matrix(archive, matrix)
}

fn write_table<W: Write + Seek, T: MetadataTable>(
    archive: &mut ArchiveBuilder<'_, W>,
    group: &str,
    name_member: &str,
    table: &T,
    polygons: Option<&[Polygon]>,
) -> Result<(), ContainerError> {
    let columns = table.scalar_columns();
    let mut members = vec![name_member.to_string()];
    members.extend(columns.iter().map(|(name, _)| name.to_string()));
    if polygons.is_some() {
        members.push(entries::CELL_POINT.to_string());
    }

    archive.add_group(
        group,
        &GroupDescriptor::new(ENCODING_DATAFRAME, vec![table.len()], members),
    )?;
    archive.add_dataset(
        &format!("{group}/{name_member}"),
        &Dataset::vector(ArrayData::Utf8(table.names().to_vec())),
    )?;
    for (name, values) in columns {
        archive.add_dataset(
            &format!("{group}/{name}"),
            &Dataset::vector(ArrayData::Float64(values.to_vec())),
        )?;
    }
    if let Some(polygons) = polygons {
        write_polygons(archive, &format!("{group}/{}", entries::CELL_POINT), polygons)?;
    }
    Ok(())
}

fn write_polygons<W: Write + Seek>(
    archive: &mut ArchiveBuilder<'_, W>,
    group: &str,
    polygons: &[Polygon],
) -> Result<(), ContainerError> {
    let mut offsets = Vec::with_capacity(polygons.len() + 1);
    let mut coords = Vec::new();
    offsets.push(0u64);
    for polygon in polygons {
        for vertex in polygon.vertices() {
            coords.push(vertex.x);
            coords.push(vertex.y);
        }
        offsets.push((coords.len() / 2) as u64);
    }
    let n_vertices = coords.len() / 2;

    archive.add_group(
        group,
        &GroupDescriptor::new(
            ENCODING_POLYGONS,
            vec![polygons.len()],
            vec!["offsets".to_string(), "coords".to_string()],
        ),
    )?;
    archive.add_dataset(
        &format!("{group}/offsets"),
        &Dataset::vector(ArrayData::UInt64(offsets)),
    )?;
    archive.add_dataset(
        &format!("{group}/coords"),
        &Dataset::with_shape(ArrayData::Float64(coords), vec![n_vertices, 2])?,
    )
}

fn write_matrix<W: Write + Seek>(
    archive: &mut ArchiveBuilder<'_, W>,
    matrix: &ExpressionMatrix,
) -> Result<(), ContainerError> {
    let (n_rows, n_cols) = matrix.shape();
    let compressed: &CompressedMatrix = match matrix {
        ExpressionMatrix::Dense(dense) => {
            return archive.add_dataset(
                entries::EXP_MATRIX,
                &Dataset::with_shape(
                    ArrayData::UInt64(dense.values().to_vec()),
                    vec![n_rows, n_cols],
                )?,
            );
        }
        ExpressionMatrix::Csr(m) | ExpressionMatrix::Csc(m) => m,
    };

    let format: MatrixFormat = matrix.format();
    let group = entries::EXP_MATRIX;
    archive.add_group(
        group,
        &GroupDescriptor::new(
            format.encoding(),
            vec![n_rows, n_cols],
            vec!["data".to_string(), "indices".to_string(), "indptr".to_string()],
        ),
    )?;
    archive.add_dataset(
        &format!("{group}/data"),
        &Dataset::vector(ArrayData::UInt64(compressed.data().to_vec())),
    )?;
    archive.add_dataset(
        &format!("{group}/indices"),
        &Dataset::vector(ArrayData::from_indices(compressed.indices())),
    )?;
    archive.add_dataset(
        &format!("{group}/indptr"),
        &Dataset::vector(ArrayData::from_indices(compressed.indptr())),
    )
}

/// ZIP writer that knows the container's entry conventions.
struct ArchiveBuilder<'a, W: Write + Seek> {
    zip: ZipWriter<W>,
    config: &'a ContainerConfig,
    entries: usize,
    datasets: usize,
}

impl<'a, W: Write + Seek> ArchiveBuilder<'a, W> {
    fn new(inner: W, config: &'a ContainerConfig) -> Result<Self, ContainerError> {
        let mut zip = ZipWriter::new(inner);
        zip.start_file(entries::MIMETYPE, stored())?;
        zip.write_all(STEREO_MIMETYPE.as_bytes())?;
        Ok(Self {
            zip,
            config,
            entries: 1,
            datasets: 0,
        })
    }

    fn add_dataset(&mut self, path: &str, dataset: &Dataset) -> Result<(), ContainerError> {
        let bytes = dataset.encode(self.config)?;
        self.zip.start_file(dataset_path(path), stored())?;
        self.zip.write_all(&bytes)?;
        self.entries += 1;
        self.datasets += 1;
        Ok(())
    }

    fn add_group(&mut self, group: &str, descriptor: &GroupDescriptor) -> Result<(), ContainerError> {
        self.add_json(&descriptor_path(group), descriptor)
    }

    fn add_json<T: Serialize>(&mut self, path: &str, value: &T) -> Result<(), ContainerError> {
        let json = serde_json::to_string_pretty(value)?;
        self.zip.start_file(path, deflated())?;
        self.zip.write_all(json.as_bytes())?;
        self.entries += 1;
        Ok(())
    }

    fn finish(self) -> Result<(usize, usize, W), ContainerError> {
        let inner = self.zip.finish()?;
        Ok((self.entries, self.datasets, inner))
    }
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
}
