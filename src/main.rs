//! # stereo-exp
//!
//! Command-line front end for spatial expression datasets.
//!
//! ## Usage
//!
//! ```bash
//! # Bin a spot table on a 50-unit grid and write a container
//! stereo-exp convert spots.tsv out.stereo --bin-size 50
//!
//! # One bin per segmented cell, with QC columns
//! stereo-exp convert cells.gem --bin-type cell_bins --qc
//!
//! # Inspect and validate a container
//! stereo-exp info out.stereo
//! stereo-exp validate out.stereo
//!
//! # Dense table of two genes across all cells
//! stereo-exp table out.stereo --gene Gapdh --gene Actb
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
