use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;

use super::arrays::VALUE_COLUMN;

/// Compression options for array payloads
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

/// Configuration for writing a store
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Compression applied inside each Parquet payload
    pub compression: CompressionType,

    /// Replace an existing store file instead of failing
    pub overwrite: bool,
}

impl StoreConfig {
    /// Configuration optimized for small files
    pub fn max_compression() -> Self {
        Self {
            compression: CompressionType::Zstd(22),
            ..Self::default()
        }
    }

    /// Configuration optimized for fast writing
    pub fn fast_write() -> Self {
        Self {
            compression: CompressionType::Snappy,
            ..Self::default()
        }
    }

    /// Same configuration with overwrite enabled
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Parquet writer properties for one array payload
    pub(super) fn to_writer_properties(&self, array_name: &str) -> WriterProperties {
        let compression = match self.compression {
            CompressionType::Zstd(level) => {
                Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default())
            }
            CompressionType::Snappy => Compression::SNAPPY,
            CompressionType::Uncompressed => Compression::UNCOMPRESSED,
        };

        // Sample values are high-cardinality floats
        let column = ColumnPath::new(vec![VALUE_COLUMN.to_string()]);

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(EnabledStatistics::Chunk)
            .set_column_dictionary_enabled(column.clone(), false)
            .set_column_encoding(column, Encoding::BYTE_STREAM_SPLIT)
            .set_key_value_metadata(Some(vec![KeyValue {
                key: "sigtree:array".to_string(),
                value: Some(array_name.to_string()),
            }]))
            .build()
    }
}
