/// Errors that can occur while building, writing or reading a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error building an Arrow record batch
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error encoding or decoding a Parquet payload
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Error serializing/deserializing the manifest
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Container is not a valid store
    #[error("Invalid store format: {0}")]
    InvalidFormat(String),

    /// Store already exists and overwrite was not requested
    #[error("Store already exists: {0}")]
    AlreadyExists(String),

    /// Output path cannot hold a store
    #[error("Invalid store path: {0}")]
    InvalidPath(String),

    /// An entity with the same name already exists in its parent
    #[error("Duplicate {kind} name '{name}'")]
    DuplicateName {
        /// Entity kind
        kind: &'static str,
        /// Offending name
        name: String,
    },

    /// Property values do not share one scalar kind
    #[error("Property '{name}' has values of different types")]
    HeterogeneousValues {
        /// Property name
        name: String,
    },

    /// Property created without any value
    #[error("Property '{name}' has no values")]
    EmptyProperty {
        /// Property name
        name: String,
    },

    /// Referenced entity does not exist
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Entity kind
        kind: &'static str,
        /// Name or id that was looked up
        name: String,
    },

    /// Write attempted on a store opened for reading
    #[error("Store is read-only")]
    ReadOnly,

    /// Data length does not match the declared shape
    #[error("Data array '{name}' has {actual} values, shape requires {expected}")]
    ShapeMismatch {
        /// Data array name
        name: String,
        /// Product of the shape
        expected: usize,
        /// Number of values given
        actual: usize,
    },

    /// Dimension descriptor does not fit the array
    #[error("Dimension mismatch on '{name}': {reason}")]
    DimensionMismatch {
        /// Data array name
        name: String,
        /// What did not fit
        reason: String,
    },

    /// Index outside of an array or list
    #[error("Index {index} out of bounds for {what} of length {len}")]
    OutOfBounds {
        /// What was indexed
        what: &'static str,
        /// Requested index
        index: usize,
        /// Available length
        len: usize,
    },
}
