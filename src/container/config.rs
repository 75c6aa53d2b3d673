use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;

use super::VALUES_COLUMN;

/// Compression options for container datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD compression at the given level
    Zstd(i32),
    /// Snappy compression (faster, slightly larger files)
    Snappy,
    /// No compression
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::Zstd(3)
    }
}

impl CompressionType {
    /// Parse a CLI/TOML compression level: `0` disables compression, `1..=22`
    /// selects a ZSTD level.
    pub fn from_level(level: i32) -> Self {
        if level <= 0 {
            Self::Uncompressed
        } else {
            Self::Zstd(level.min(22))
        }
    }
}

/// Parquet settings applied to every dataset in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Compression codec
    pub compression: CompressionType,

    /// Maximum rows per row group
    pub row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Whether to write column chunk statistics
    pub write_statistics: bool,

    /// BYTE_STREAM_SPLIT encoding for Float64 datasets
    pub use_byte_stream_split: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::Zstd(3),
            row_group_size: 1_000_000,
            data_page_size: 1024 * 1024,
            write_statistics: true,
            use_byte_stream_split: true,
        }
    }
}

impl ContainerConfig {
    /// Smallest files, slowest writes
    pub fn max_compression() -> Self {
        Self {
            compression: CompressionType::Zstd(19),
            row_group_size: 4_000_000,
            data_page_size: 2 * 1024 * 1024,
            ..Self::default()
        }
    }

    /// Fastest writes, larger files
    pub fn fast() -> Self {
        Self {
            compression: CompressionType::Snappy,
            row_group_size: 500_000,
            data_page_size: 512 * 1024,
            write_statistics: false,
            ..Self::default()
        }
    }

    /// Same as [`ContainerConfig::default`]
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Writer properties for one dataset. `float` selects the floating-point
    /// encoding path; `metadata` lands in the Parquet footer.
    pub(super) fn to_writer_properties(
        &self,
        float: bool,
        metadata: Vec<(String, String)>,
    ) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default())
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let mut builder = WriterProperties::builder()
            .set_compression(compression)
            .set_data_page_size_limit(self.data_page_size)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size);

        if float && self.use_byte_stream_split {
            let column = ColumnPath::new(vec![VALUES_COLUMN.to_string()]);
            builder = builder
                .set_column_dictionary_enabled(column.clone(), false)
                .set_column_encoding(column, Encoding::BYTE_STREAM_SPLIT);
        }

        let kv_metadata: Vec<KeyValue> = metadata
            .into_iter()
            .map(|(key, value)| KeyValue {
                key,
                value: Some(value),
            })
            .collect();
        builder = builder.set_key_value_metadata(Some(kv_metadata));

        builder.build()
    }
}
