#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use stereo_exp::binning::BinType;
use stereo_exp::diagnostics::NullSink;
use stereo_exp::ingest::{ingest_reader, IngestOptions};
use stereo_exp::metadata::MetadataTable;

fuzz_target!(|data: &[u8]| {
    // Spot tables are untrusted: ingestion must fail with an error, never panic.
    let grid = IngestOptions::new().with_bin_size(7);
    if let Ok(parts) = ingest_reader(Cursor::new(data), &grid, &NullSink) {
        assert_eq!(parts.matrix.n_rows(), parts.cells.names().len());
        assert_eq!(parts.matrix.n_rows(), parts.position.len());
    }

    let cells = IngestOptions::new().with_bin_type(BinType::CellBins);
    let _ = ingest_reader(Cursor::new(data), &cells, &NullSink);
});
