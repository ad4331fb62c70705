use crate::store::StoreError;

/// Errors while writing or reading the signal arrays
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Neither buffer orientation matches the channel and sample counts
    #[error("Buffer shape {shape:?} matches neither ({channels}, {samples}) nor ({samples}, {channels})")]
    ShapeMismatch {
        /// Buffer shape
        shape: [usize; 2],
        /// Expected channel count
        channels: usize,
        /// Expected sample count
        samples: usize,
    },

    /// Sample rate, channel names or unit are unusable
    #[error("Invalid signal header: {0}")]
    InvalidHeader(String),

    /// Stored arrays do not form a readable signal
    #[error("Corrupt signal layout: {0}")]
    Corrupt(String),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
