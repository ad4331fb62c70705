use crate::signal::{LayoutError, PhysicalLayout};
use crate::store::StoreError;

/// Errors while tagging events or reading them back
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// Tagging layout differs from the layout of the written arrays
    #[error("Events tagged for {requested} layout but signal was written as {written}")]
    LayoutMismatch {
        /// Layout of the arrays in the store
        written: PhysicalLayout,
        /// Layout the tagger was called with
        requested: PhysicalLayout,
    },

    /// No signal array for the named channel
    #[error("Unknown channel '{0}'")]
    UnknownChannel(String),

    /// Tag entities are inconsistent
    #[error("Corrupt event tag: {0}")]
    Corrupt(String),

    /// Error locating the signal arrays
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
