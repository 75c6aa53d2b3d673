use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use stereo_exp::binning::BinType;
use stereo_exp::ingest::IngestOptions;

mod config;
mod convert;
mod info;
mod profile;
mod table;
mod validate;

pub use config::Config;
pub use profile::Profile;

/// stereo-exp - Spatial Transcriptomics Expression Converter
#[derive(Parser)]
#[command(name = "stereo-exp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Container write profile for trading speed against size.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProfileArg {
    /// Prioritize speed over size
    Fast,
    /// Balance between speed and size
    #[default]
    Balanced,
    /// Smallest files, slower writes
    MaxCompression,
}

/// Binning mode for spot tables.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BinTypeArg {
    /// Square grid bins of `--bin-size`
    Bins,
    /// One bin per labelled cell
    #[value(name = "cell_bins", alias = "cell-bins")]
    CellBins,
}

impl From<BinTypeArg> for BinType {
    fn from(arg: BinTypeArg) -> Self {
        match arg {
            BinTypeArg::Bins => BinType::Bins,
            BinTypeArg::CellBins => BinType::CellBins,
        }
    }
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Fast => Profile::Fast,
            ProfileArg::Balanced => Profile::Balanced,
            ProfileArg::MaxCompression => Profile::MaxCompression,
        }
    }
}

/// Flags controlling how spot tables are read.
#[derive(clap::Args, Debug, Default)]
struct IngestArgs {
    /// Binning mode (default: bins)
    #[arg(long, value_enum)]
    bin_type: Option<BinTypeArg>,

    /// Grid bin edge length (default: 100)
    #[arg(long)]
    bin_size: Option<u32>,

    /// Field separator of the spot table (default: tab)
    #[arg(long, value_parser = config::parse_separator)]
    sep: Option<u8>,

    /// Store the matrix dense instead of CSR
    #[arg(long)]
    dense: bool,

    /// Load ingestion settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl IngestArgs {
    /// Defaults, then the config file, then explicit flags.
    fn resolve(&self, config: &Config) -> Result<IngestOptions> {
        let mut options = config.apply_ingest(IngestOptions::default())?;
        if let Some(bin_type) = self.bin_type {
            options.bin_type = Some(bin_type.into());
        }
        if let Some(bin_size) = self.bin_size {
            options.bin_size = bin_size;
        }
        if let Some(sep) = self.sep {
            options.separator = sep;
        }
        if self.dense {
            options.sparse = false;
        }
        Ok(options)
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Ok(Config::default()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spot table or container to a .stereo container
    Convert {
        /// Input spot table (.tsv/.txt/.csv/.gem) or .stereo container
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output container path (defaults to <input stem>.stereo)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        #[command(flatten)]
        ingest: IngestArgs,

        /// Write profile (fast, balanced, max-compression)
        #[arg(short = 'p', long, default_value = "balanced", value_enum)]
        profile: ProfileArg,

        /// Compute per-cell and per-gene QC columns before writing
        #[arg(long)]
        qc: bool,

        /// Compression level for ZSTD (0 disables, 1-22; default: profile-dependent)
        #[arg(short = 'c', long, hide = true)]
        compression_level: Option<i32>,
    },

    /// Print a labelled expression table
    Table {
        /// Input spot table or .stereo container
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Restrict to these cells (repeatable)
        #[arg(long = "cell", value_name = "NAME")]
        cells: Vec<String>,

        /// Restrict to these genes (repeatable)
        #[arg(long = "gene", value_name = "NAME")]
        genes: Vec<String>,

        #[command(flatten)]
        ingest: IngestArgs,

        /// Output delimiter (default: tab)
        #[arg(long, value_parser = config::parse_separator, default_value = "tab")]
        out_sep: u8,
    },

    /// Display information about a .stereo container
    Info {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate .stereo container integrity
    Validate {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            ingest,
            profile,
            qc,
            compression_level,
        } => {
            let config = ingest.load_config()?;
            let options = ingest.resolve(&config)?;
            let level = compression_level.or(config.container.compression_level);
            let container = Profile::from(profile).with_compression_level(level);
            convert::run(input, output, options, container, qc)
        }
        Commands::Table {
            input,
            output,
            cells,
            genes,
            ingest,
            out_sep,
        } => {
            let config = ingest.load_config()?;
            let options = ingest.resolve(&config)?;
            table::run(input, output, cells, genes, options, out_sep)
        }
        Commands::Info { file } => info::run(file),
        Commands::Validate { file } => validate::run(file),
    }
}
