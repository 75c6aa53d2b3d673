use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::*;
use crate::binning::BinType;
use crate::dataset::{DatasetParts, StereoExpData};
use crate::diagnostics::{MemorySink, NullSink};
use crate::geometry::{Point, Polygon};
use crate::matrix::{ExpressionMatrix, MatrixFormat};
use crate::metadata::{CellAttribute, CellTable, GeneTable, MetadataTable};

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// 3 cells x 4 genes with QC columns and hulls on the cells.
fn sample(format: MatrixFormat) -> StereoExpData {
    let matrix = ExpressionMatrix::from_triplets(
        &[0, 0, 1, 2, 2],
        &[0, 3, 1, 0, 2],
        &[5, 1, 7, 2, 9],
        3,
        4,
    )
    .unwrap()
    .to_format(format);

    let triangle = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
    ]);
    let segment = Polygon::new(vec![Point::new(2.0, 2.0), Point::new(3.0, 3.0)]);
    let single = Polygon::new(vec![Point::new(0.1 + 0.2, 1e-300)]);

    let mut cells = CellTable::new(names(&["7", "12", "40"]))
        .with_cell_point(vec![triangle, segment, single]);
    cells.set_attribute(CellAttribute::TotalCounts, vec![6.0, 7.0, 11.0]);

    StereoExpData::from_parts(DatasetParts {
        matrix,
        cells,
        genes: GeneTable::new(names(&["Gapdh", "Actb", "mt-Co1", "Malat1"])),
        position: vec![[0.1 + 0.2, -1.5], [f64::MAX, 2.0 / 3.0], [1e-310, 0.0]],
        bin_type: Some(BinType::CellBins),
        bin_size: 50,
    })
    .unwrap()
}

fn write_to(path: &Path, data: &StereoExpData) -> WriteStats {
    ContainerWriter::default()
        .write(Some(path), data, &NullSink)
        .unwrap()
}

fn round_trip(format: MatrixFormat) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.stereo");
    let data = sample(format);
    write_to(&path, &data);

    let parts = read_container(&path, &NullSink).unwrap();
    assert_eq!(parts.matrix.format(), format);
    assert_eq!(&parts.matrix, data.matrix());
    assert_eq!(&parts.cells, data.cells());
    assert_eq!(&parts.genes, data.genes());
    assert_eq!(parts.bin_type, Some(BinType::CellBins));
    assert_eq!(parts.bin_size, 50);

    // Bit-exact coordinates
    for (read, written) in parts.position.iter().zip(data.position()) {
        assert_eq!(read[0].to_bits(), written[0].to_bits());
        assert_eq!(read[1].to_bits(), written[1].to_bits());
    }
}

#[test]
fn test_round_trip_csr() {
    round_trip(MatrixFormat::Csr);
}

#[test]
fn test_round_trip_csc() {
    round_trip(MatrixFormat::Csc);
}

#[test]
fn test_round_trip_dense() {
    round_trip(MatrixFormat::Dense);
}

#[test]
fn test_unset_bin_type_is_omitted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unset.stereo");
    let mut data = sample(MatrixFormat::Csr);
    data.set_bin_type(None);
    write_to(&path, &data);

    let summary = summarize(&path).unwrap();
    assert!(!summary
        .entries
        .iter()
        .any(|e| e.name == "bin_type.parquet"));
    assert_eq!(summary.manifest.as_ref().unwrap().bin_type, None);

    let parts = read_container(&path, &NullSink).unwrap();
    assert_eq!(parts.bin_type, None);
}

#[test]
fn test_empty_dataset_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.stereo");
    write_to(&path, &StereoExpData::new());

    let parts = read_container(&path, &NullSink).unwrap();
    assert_eq!(parts.matrix.shape(), (0, 0));
    assert!(parts.cells.names().is_empty());
    assert!(parts.position.is_empty());
}

#[test]
fn test_mimetype_is_first_and_stored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.stereo");
    write_to(&path, &sample(MatrixFormat::Csr));

    let mut archive = ZipArchive::new(fs::File::open(&path).unwrap()).unwrap();
    let mut first = archive.by_index(0).unwrap();
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), CompressionMethod::Stored);
    let mut content = String::new();
    first.read_to_string(&mut content).unwrap();
    assert_eq!(content, STEREO_MIMETYPE);
}

#[test]
fn test_layout_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.stereo");
    let stats = write_to(&path, &sample(MatrixFormat::Csc));

    let summary = summarize(&path).unwrap();
    let listed: Vec<&str> = summary.entries.iter().map(|e| e.name.as_str()).collect();
    for expected in [
        "manifest.json",
        "cells/.group.json",
        "cells/cell_name.parquet",
        "cells/total_counts.parquet",
        "cells/cell_point/.group.json",
        "cells/cell_point/offsets.parquet",
        "cells/cell_point/coords.parquet",
        "genes/gene_name.parquet",
        "position.parquet",
        "bin_type.parquet",
        "bin_size.parquet",
        "exp_matrix/.group.json",
        "exp_matrix/indptr.parquet",
    ] {
        assert!(listed.contains(&expected), "missing {expected}");
    }
    assert!(summary
        .entries
        .iter()
        .filter(|e| e.name.ends_with(".parquet"))
        .all(|e| e.stored));

    assert_eq!(stats.entries_written, summary.entries.len());
    assert_eq!(stats.datasets_written, summary.dataset_count());
    assert_eq!(stats.total_size_bytes, summary.file_size);

    let manifest = summary.manifest.unwrap();
    assert_eq!(manifest.format_version, FORMAT_VERSION);
    assert_eq!(manifest.matrix_format, "csc_matrix");
    assert_eq!((manifest.n_cells, manifest.n_genes, manifest.nnz), (3, 4, 5));
}

#[test]
fn test_unknown_entries_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("extended.stereo");
    let data = sample(MatrixFormat::Csr);
    write_to(&path, &data);

    let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let mut zip = ZipWriter::new_append(file).unwrap();
    zip.start_file("uns/notes.txt", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"free-form").unwrap();
    zip.finish().unwrap();

    let sink = MemorySink::new();
    let parts = read_container(&path, &sink).unwrap();
    assert_eq!(&parts.matrix, data.matrix());
    assert!(sink.contains("uns"));
}

#[test]
fn test_wrong_mimetype_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.stereo");
    let mut zip = ZipWriter::new(fs::File::create(&path).unwrap());
    zip.start_file(
        "mimetype",
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
    )
    .unwrap();
    zip.write_all(b"application/zip").unwrap();
    zip.finish().unwrap();

    let err = read_container(&path, &NullSink).unwrap_err();
    assert!(matches!(err, ContainerError::InvalidFormat(ref msg) if msg.contains("mimetype")));
}

#[test]
fn test_missing_container() {
    let err = read_container("/nonexistent/data.stereo", &NullSink).unwrap_err();
    assert!(matches!(err, ContainerError::MissingFile(_)));
}

#[test]
fn test_write_requires_destination() {
    let err = ContainerWriter::default()
        .write(None, &sample(MatrixFormat::Csr), &NullSink)
        .unwrap_err();
    assert!(matches!(err, ContainerError::OutputPath));
}

#[test]
fn test_failed_write_leaves_nothing_behind() {
    let dir = tempdir().unwrap();
    // A directory at the destination makes the final rename fail.
    let destination = dir.path().join("taken.stereo");
    fs::create_dir(&destination).unwrap();

    let result = ContainerWriter::default().write(
        Some(&destination),
        &sample(MatrixFormat::Csr),
        &NullSink,
    );
    assert!(result.is_err());

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1);
    assert!(destination.is_dir());
}

#[test]
fn test_overwrites_existing_container() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.stereo");
    write_to(&path, &sample(MatrixFormat::Dense));
    write_to(&path, &sample(MatrixFormat::Csr));

    let parts = read_container(&path, &NullSink).unwrap();
    assert_eq!(parts.matrix.format(), MatrixFormat::Csr);
}

#[test]
fn test_dataset_scalar_shape() {
    let dataset = Dataset::scalar(ArrayData::Int64(vec![100])).unwrap();
    let decoded = Dataset::decode(dataset.encode(&ContainerConfig::default()).unwrap().into()).unwrap();
    assert!(decoded.shape.is_empty());
    assert_eq!(decoded.into_i64("bin_size").unwrap(), vec![100]);

    assert!(Dataset::with_shape(ArrayData::Float64(vec![1.0, 2.0, 3.0]), vec![2, 2]).is_err());
}

#[test]
fn test_oversized_shape_is_rejected() {
    let crafted = Dataset {
        data: ArrayData::UInt64(Vec::new()),
        shape: vec![1 << 40, 1 << 40],
    };
    let bytes = crafted.encode(&ContainerConfig::default()).unwrap();
    let err = Dataset::decode(bytes.into()).unwrap_err();
    assert!(matches!(err, ContainerError::InvalidFormat(ref msg) if msg.contains("too large")));

    assert!(Dataset::with_shape(ArrayData::UInt64(Vec::new()), vec![usize::MAX, 2]).is_err());
}

#[test]
fn test_dataset_type_mismatch_names_entry() {
    let dataset = Dataset::vector(ArrayData::Utf8(names(&["a"])));
    let err = dataset.into_f64("cells/total_counts").unwrap_err();
    assert!(err.to_string().contains("cells/total_counts"));
}

#[test]
fn test_compression_levels() {
    assert_eq!(CompressionType::from_level(0), CompressionType::Uncompressed);
    assert_eq!(CompressionType::from_level(9), CompressionType::Zstd(9));
    assert_eq!(CompressionType::from_level(40), CompressionType::Zstd(22));

    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.stereo");
    let config = ContainerConfig {
        compression: CompressionType::Uncompressed,
        ..ContainerConfig::default()
    };
    ContainerWriter::new(config)
        .write(Some(&path), &sample(MatrixFormat::Csr), &NullSink)
        .unwrap();
    assert!(read_container(&path, &NullSink).is_ok());
}

#[test]
fn test_validate_written_container() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.stereo");
    write_to(&path, &sample(MatrixFormat::Csr));

    let report = validate_container(&path).unwrap();
    assert!(!report.has_failures(), "{report}");
    assert!(report.to_string().contains("Validation PASSED"));
}

#[test]
fn test_validate_reports_bad_mimetype() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.stereo");
    let mut zip = ZipWriter::new(fs::File::create(&path).unwrap());
    zip.start_file("manifest.json", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"{}").unwrap();
    zip.finish().unwrap();

    let report = validate_container(&path).unwrap();
    assert!(report.has_failures());
    assert!(report
        .checks
        .iter()
        .any(|c| c.name == "mimetype is first entry" && matches!(c.status, CheckStatus::Failed(_))));
}

#[test]
fn test_validate_missing_path() {
    assert!(validate_container(Path::new("/nonexistent/x.stereo")).is_err());
}

#[test]
fn test_report_display_counts() {
    let mut report = ValidationReport::new("x.stereo");
    report.add_check(ValidationCheck::ok("one"));
    report.add_check(ValidationCheck::warning("two", "careful"));
    report.add_check(ValidationCheck::failed("three", "broken"));

    let output = report.to_string();
    assert!(output.contains("1 passed, 1 warnings, 1 failed"));
    assert!(output.contains("Validation FAILED"));
}
