use crate::store::StoreError;

/// Fatal errors while writing a metadata tree
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Array values stay heterogeneous after float coercion
    #[error("Cannot encode '{path}': array elements have no common type")]
    Heterogeneous {
        /// Dotted key path
        path: String,
    },

    /// Store rejected an entity
    #[error("Store error at '{path}': {source}")]
    Store {
        /// Dotted key path
        path: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },
}

/// Fatal errors while reading a metadata tree back
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Property type tag outside the known table
    #[error("Unknown property type '{tag}' at '{path}'")]
    UnknownType {
        /// Dotted key path
        path: String,
        /// Offending tag
        tag: String,
    },

    /// Section type tag outside the known table
    #[error("Unknown section type '{tag}' at '{path}'")]
    UnknownSectionType {
        /// Dotted key path
        path: String,
        /// Offending tag
        tag: String,
    },

    /// Property values do not match the declared type
    #[error("Property '{path}' declared as {expected} but holds {found}")]
    TypeMismatch {
        /// Dotted key path
        path: String,
        /// Declared type tag
        expected: String,
        /// Description of the stored values
        found: String,
    },

    /// Two entries decode to the same key
    #[error("Duplicate key '{path}'")]
    DuplicateKey {
        /// Dotted key path
        path: String,
    },

    /// List element section without a preceding element 0
    #[error("List element '{path}' is out of sequence")]
    OrphanListItem {
        /// Dotted key path
        path: String,
    },

    /// Data array reference cannot be resolved
    #[error("Invalid data reference at '{path}': {reason}")]
    InvalidReference {
        /// Dotted key path
        path: String,
        /// What went wrong
        reason: String,
    },
}
