//! Container write profiles.
//!
//! Profiles pick Parquet settings for common trade-offs so end users never
//! see row group or page sizes.

use std::fmt;
use std::str::FromStr;

use stereo_exp::container::{CompressionType, ContainerConfig};

/// Container write profiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Prioritize speed over size.
    ///
    /// - Compression: Snappy
    /// - No column statistics
    Fast,

    /// Balance between speed and size (default).
    ///
    /// - Compression: ZSTD level 3
    #[default]
    Balanced,

    /// Smallest files, slower writes.
    ///
    /// - Compression: ZSTD level 19
    MaxCompression,
}

impl Profile {
    /// Container settings for this profile.
    pub fn container_config(&self) -> ContainerConfig {
        match self {
            Profile::Fast => ContainerConfig::fast(),
            Profile::Balanced => ContainerConfig::balanced(),
            Profile::MaxCompression => ContainerConfig::max_compression(),
        }
    }

    /// Container settings for this profile with an explicit compression level.
    pub fn with_compression_level(&self, level: Option<i32>) -> ContainerConfig {
        let mut config = self.container_config();
        if let Some(level) = level {
            config.compression = CompressionType::from_level(level);
        }
        config
    }

    /// Returns all available profile names.
    pub fn variants() -> &'static [&'static str] {
        &["fast", "balanced", "max-compression"]
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Fast => write!(f, "fast"),
            Profile::Balanced => write!(f, "balanced"),
            Profile::MaxCompression => write!(f, "max-compression"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Profile::Fast),
            "balanced" | "default" => Ok(Profile::Balanced),
            "max-compression" | "maxcompression" | "max" => Ok(Profile::MaxCompression),
            _ => Err(format!(
                "Unknown profile '{}'. Valid options: {}",
                s,
                Profile::variants().join(", ")
            )),
        }
    }
}
