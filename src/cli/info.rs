use anyhow::{Context, Result};
use std::path::PathBuf;

use stereo_exp::container::summarize;

/// Display information about a `.stereo` container
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let summary = summarize(&file).context("Failed to read container")?;

    println!("Stereo Container Information");
    println!("============================");
    println!("File: {}", file.display());
    println!(
        "Size: {} bytes ({:.2} MB)",
        summary.file_size,
        summary.file_size as f64 / 1024.0 / 1024.0
    );
    println!();

    match &summary.manifest {
        Some(manifest) => {
            println!("Manifest:");
            println!("  Format version: {}", manifest.format_version);
            println!("  Dataset id: {}", manifest.dataset_id);
            println!("  Created: {}", manifest.created);
            println!("  Converter: {}", manifest.converter);
            println!("  Cells: {}", manifest.n_cells);
            println!("  Genes: {}", manifest.n_genes);
            println!("  Stored counts: {}", manifest.nnz);
            println!("  Matrix format: {}", manifest.matrix_format);
            println!(
                "  Bin type: {}",
                manifest.bin_type.as_deref().unwrap_or("<unset>")
            );
            println!("  Bin size: {}", manifest.bin_size);
        }
        None => println!("Manifest: <missing or unreadable>"),
    }
    println!();

    println!("Entries ({} datasets):", summary.dataset_count());
    for entry in &summary.entries {
        println!(
            "  {:<40} {:>12} bytes{}",
            entry.name,
            entry.size,
            if entry.stored { "" } else { " (deflated)" }
        );
    }

    Ok(())
}
