//! Integration tests for the .stereo ZIP container format
//!
//! These tests verify:
//! 1. MimeType compliance (first entry, uncompressed)
//! 2. Parquet datasets are Stored, JSON documents Deflated
//! 3. Every dataset is a readable single-column Parquet file
//! 4. Group descriptors list their members

use std::fs::File;
use std::io::Read;

use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use stereo_exp::container::{GroupDescriptor, Manifest, STEREO_MIMETYPE, VALUES_COLUMN};
use stereo_exp::prelude::*;
use tempfile::tempdir;
use zip::{CompressionMethod, ZipArchive};

fn sample() -> StereoExpData {
    let matrix = ExpressionMatrix::from_triplets(&[0, 1, 1], &[1, 0, 1], &[3, 4, 1], 2, 2).unwrap();
    let mut data = StereoExpData::from_parts(DatasetParts {
        matrix,
        cells: CellTable::new(vec!["0_0".into(), "0_1".into()]),
        genes: GeneTable::new(vec!["Gapdh".into(), "mt-Nd1".into()]),
        position: vec![[50.0, 50.0], [50.0, 150.0]],
        bin_type: Some(BinType::Bins),
        bin_size: 100,
    })
    .unwrap();
    data.fill_qc().unwrap();
    data
}

fn written(name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    ContainerWriter::default()
        .write(Some(&path), &sample(), &NullSink)
        .unwrap();
    (dir, path)
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Vec<u8> {
    let mut entry = archive.by_name(name).unwrap();
    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer).unwrap();
    buffer
}

#[test]
fn test_mimetype_first_and_uncompressed() {
    let (_dir, path) = written("mime.stereo");
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();

    let first = archive.by_index(0).unwrap();
    assert_eq!(first.name(), "mimetype");
    assert_eq!(first.compression(), CompressionMethod::Stored);
    drop(first);

    assert_eq!(read_entry(&mut archive, "mimetype"), STEREO_MIMETYPE.as_bytes());
}

#[test]
fn test_entry_compression_methods() {
    let (_dir, path) = written("methods.stereo");
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();

    for i in 0..archive.len() {
        let entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        if name.ends_with(".parquet") {
            assert_eq!(entry.compression(), CompressionMethod::Stored, "{name}");
        } else if name.ends_with(".json") {
            assert_eq!(entry.compression(), CompressionMethod::Deflated, "{name}");
        }
    }
}

#[test]
fn test_datasets_are_single_column_parquet() {
    let (_dir, path) = written("columns.stereo");
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let names: Vec<String> = archive
        .file_names()
        .filter(|n| n.ends_with(".parquet"))
        .map(str::to_string)
        .collect();
    assert!(!names.is_empty());

    for name in names {
        let bytes = Bytes::from(read_entry(&mut archive, &name));
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
        let schema = builder.schema();
        assert_eq!(schema.fields().len(), 1, "{name}");
        assert_eq!(schema.field(0).name(), VALUES_COLUMN, "{name}");
        let has_shape = builder
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .map(|kv| kv.iter().any(|e| e.key == "stereo:shape"))
            .unwrap_or(false);
        assert!(has_shape, "{name}");
    }
}

#[test]
fn test_group_descriptors() {
    let (_dir, path) = written("groups.stereo");
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();

    let cells: GroupDescriptor =
        serde_json::from_slice(&read_entry(&mut archive, "cells/.group.json")).unwrap();
    assert_eq!(cells.encoding_type, "dataframe");
    assert_eq!(cells.shape, vec![2]);
    assert_eq!(
        cells.members,
        vec!["cell_name", "total_counts", "pct_counts_mt", "n_genes_by_counts"]
    );

    let genes: GroupDescriptor =
        serde_json::from_slice(&read_entry(&mut archive, "genes/.group.json")).unwrap();
    assert_eq!(genes.members, vec!["gene_name", "n_cells", "n_counts"]);

    let matrix: GroupDescriptor =
        serde_json::from_slice(&read_entry(&mut archive, "exp_matrix/.group.json")).unwrap();
    assert_eq!(matrix.encoding_type, "csr_matrix");
    assert_eq!(matrix.shape, vec![2, 2]);

    let raw = String::from_utf8(read_entry(&mut archive, "exp_matrix/.group.json")).unwrap();
    assert!(raw.contains("\"encoding-type\""));
}

#[test]
fn test_manifest_contents() {
    let (_dir, path) = written("manifest.stereo");
    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();

    let manifest: Manifest =
        serde_json::from_slice(&read_entry(&mut archive, "manifest.json")).unwrap();
    assert_eq!(manifest.n_cells, 2);
    assert_eq!(manifest.n_genes, 2);
    assert_eq!(manifest.nnz, 3);
    assert_eq!(manifest.bin_type.as_deref(), Some("bins"));
    assert_eq!(manifest.bin_size, 100);
    assert!(manifest.converter.starts_with("stereo-exp"));
}

#[test]
fn test_summary_and_validation_agree() {
    let (_dir, path) = written("summary.stereo");

    let summary = summarize(&path).unwrap();
    assert_eq!(summary.manifest.as_ref().map(|m| m.n_cells), Some(2));
    assert!(summary.dataset_count() >= 10);

    let report = validate_container(&path).unwrap();
    assert!(!report.has_failures(), "{report}");
    assert_eq!(report.warning_count(), 0);
}
