use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use stereo_exp::container::{ContainerConfig, STEREO_EXTENSION};
use stereo_exp::dataset::StereoExpData;
use stereo_exp::diagnostics::LogSink;
use stereo_exp::ingest::IngestOptions;

/// Convert a spot table (or an existing container) into a `.stereo` container
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    options: IngestOptions,
    container: ContainerConfig,
    qc: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    let output = output.unwrap_or_else(|| default_output(&input));

    info!("Stereo Converter");
    info!("================");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());
    info!(
        "Binning: {} (bin size {})",
        options.effective_bin_type(),
        options.bin_size
    );
    info!("Compression: {:?}", container.compression);

    let sink = LogSink::new("convert");
    let mut data = StereoExpData::new()
        .with_file(&input, None)
        .with_output(&output)
        .with_bin_size(options.bin_size);
    data.read(&options, &sink)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    if qc {
        data.fill_qc().context("Failed to compute QC metrics")?;
    }

    let stats = data
        .write(&container, &sink)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Conversion complete!");
    info!("  Cells: {}", stats.n_cells);
    info!("  Genes: {}", stats.n_genes);
    info!("  Stored counts: {}", stats.nnz);
    info!(
        "  Output file size: {} bytes ({:.2} MB)",
        stats.total_size_bytes,
        stats.total_size_bytes as f64 / 1024.0 / 1024.0
    );

    Ok(())
}

/// `<stem>.stereo` beside the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let stem = stem.trim_end_matches(".gem");
    input.with_file_name(format!("{stem}.{STEREO_EXTENSION}"))
}
