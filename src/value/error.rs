/// Errors that can occur while classifying raw metadata
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// A nested array whose rows have different lengths
    #[error("Ragged array at '{path}': rows have different lengths")]
    Ragged {
        /// Dotted key path of the offending value
        path: String,
    },

    /// An array that mixes maps with scalars or arrays
    #[error("Array at '{path}' mixes maps with other values")]
    MixedContainer {
        /// Dotted key path of the offending value
        path: String,
    },

    /// An array whose elements share no type, even after float coercion
    #[error("Array at '{path}' has inconsistent element types and cannot be coerced to float")]
    Heterogeneous {
        /// Dotted key path of the offending value
        path: String,
    },

    /// The top level of a metadata document is not a map
    #[error("Expected a map at '{path}', found {found}")]
    NotAMap {
        /// Dotted key path of the offending value
        path: String,
        /// JSON type that was found instead
        found: &'static str,
    },

    /// Element count does not match the declared array shape
    #[error("Array shape {shape:?} needs {expected} elements, got {actual}")]
    ShapeMismatch {
        /// Declared shape
        shape: Vec<usize>,
        /// Product of the shape
        expected: usize,
        /// Number of elements supplied
        actual: usize,
    },
}
