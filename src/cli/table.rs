use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use stereo_exp::dataset::StereoExpData;
use stereo_exp::diagnostics::LogSink;
use stereo_exp::ingest::IngestOptions;

/// Print a labelled dense expression table, optionally restricted by name
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    cells: Vec<String>,
    genes: Vec<String>,
    options: IngestOptions,
    delimiter: u8,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let sink = LogSink::new("table");
    let mut data = StereoExpData::new()
        .with_file(&input, None)
        .with_bin_size(options.bin_size);
    data.read(&options, &sink)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
    let genes: Vec<&str> = genes.iter().map(String::as_str).collect();
    let table = data.expression_table(
        (!cells.is_empty()).then_some(cells.as_slice()),
        (!genes.is_empty()).then_some(genes.as_slice()),
    )?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    table.write_delimited(writer, delimiter)?;

    Ok(())
}
