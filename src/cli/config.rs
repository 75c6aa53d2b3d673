//! TOML configuration file support.
//!
//! Instead of passing many CLI flags, ingestion and container settings can
//! live in a config file:
//!
//! ```toml
//! # stereo.toml
//! [ingest]
//! bin_type = "bins"
//! bin_size = 50
//! separator = "\t"
//! sparse = true
//!
//! [container]
//! compression_level = 9
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use stereo_exp::binning::BinType;
use stereo_exp::ingest::IngestOptions;

/// Root configuration structure for stereo.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Raw record ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Container output settings.
    #[serde(default)]
    pub container: ContainerSection,
}

/// The `[ingest]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// `bins` or `cell_bins`.
    pub bin_type: Option<String>,

    /// Grid bin edge length.
    pub bin_size: Option<u32>,

    /// Single-character field separator; `"\t"` or `"tab"` for tabs.
    pub separator: Option<String>,

    /// Keep the matrix sparse.
    pub sparse: Option<bool>,
}

/// The `[container]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerSection {
    /// ZSTD compression level (0 disables compression, 1-22).
    pub compression_level: Option<i32>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Apply the `[ingest]` section on top of `base`.
    pub fn apply_ingest(&self, mut base: IngestOptions) -> Result<IngestOptions> {
        let section = &self.ingest;
        if let Some(bin_type) = &section.bin_type {
            base.bin_type = Some(
                bin_type
                    .parse::<BinType>()
                    .context("Invalid [ingest] bin_type")?,
            );
        }
        if let Some(bin_size) = section.bin_size {
            base.bin_size = bin_size;
        }
        if let Some(separator) = &section.separator {
            base.separator = parse_separator(separator)
                .map_err(anyhow::Error::msg)
                .context("Invalid [ingest] separator")?;
        }
        if let Some(sparse) = section.sparse {
            base.sparse = sparse;
        }
        Ok(base)
    }
}

/// Parse a field separator given on the command line or in a config file.
pub fn parse_separator(value: &str) -> std::result::Result<u8, String> {
    match value {
        "\t" | "\\t" | "tab" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(format!(
            "separator must be a single ASCII character, got '{other}'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [ingest]
            bin_type = "cell_bins"
            bin_size = 50
            separator = ","
            sparse = false

            [container]
            compression_level = 9
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.ingest.bin_size, Some(50));
        assert_eq!(config.container.compression_level, Some(9));

        let options = config.apply_ingest(IngestOptions::default()).unwrap();
        assert_eq!(options.bin_type, Some(BinType::CellBins));
        assert_eq!(options.bin_size, 50);
        assert_eq!(options.separator, b',');
        assert!(!options.sparse);
    }

    #[test]
    fn test_partial_config_keeps_base() {
        let config = Config::from_str("[ingest]\nbin_size = 200\n").unwrap();
        let options = config.apply_ingest(IngestOptions::default()).unwrap();
        assert_eq!(options.bin_size, 200);
        assert_eq!(options.separator, b'\t');
        assert_eq!(options.bin_type, None);
        assert_eq!(config.container.compression_level, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.ingest.bin_type.is_none());
        assert!(config.container.compression_level.is_none());
    }

    #[test]
    fn test_invalid_bin_type() {
        let config = Config::from_str("[ingest]\nbin_type = \"hexagons\"\n").unwrap();
        assert!(config.apply_ingest(IngestOptions::default()).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::from_str("[ingest]\nbinsize = 5\n").is_err());
    }

    #[test]
    fn test_parse_separator() {
        assert_eq!(parse_separator("\t"), Ok(b'\t'));
        assert_eq!(parse_separator("\\t"), Ok(b'\t'));
        assert_eq!(parse_separator("tab"), Ok(b'\t'));
        assert_eq!(parse_separator(";"), Ok(b';'));
        assert!(parse_separator("::").is_err());
        assert!(parse_separator("").is_err());
    }
}
