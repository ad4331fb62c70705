//! Recording to sigtree converter
//!
//! Orchestrates the forward path (metadata through the tree codec, samples
//! through the layout engine, annotations through the event tagger) and the
//! mirror import path.

use std::path::PathBuf;

use crate::codec::{DecodeError, EncodeError};
use crate::events::{EventSet, TagError};
use crate::montage::MontageError;
use crate::recording::{RawRecording, RecordingError};
use crate::signal::{LayoutError, PhysicalLayout, SignalMatrix};
use crate::store::{StoreConfig, StoreError};
use crate::value::{MetadataMap, ValueError};

/// Name of the section holding the recording info
pub const INFO_SECTION: &str = "Info";
/// Type of the info section
pub const INFO_TYPE: &str = "File metadata";
/// Name of the section holding extra reader metadata
pub const EXTRAS_SECTION: &str = "Extras";
/// Type of every extras section
pub const EXTRAS_TYPE: &str = "Raw Extras metadata";

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Error reading the input recording
    #[error("Recording error: {0}")]
    RecordingError(#[from] RecordingError),

    /// Error reading or applying the montage
    #[error("Montage error: {0}")]
    MontageError(#[from] MontageError),

    /// Metadata that cannot be classified
    #[error("Metadata error: {0}")]
    ValueError(#[from] ValueError),

    /// Metadata that cannot be encoded
    #[error("Encode error: {0}")]
    EncodeError(#[from] EncodeError),

    /// Metadata that cannot be decoded
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// Error writing or reading the signal arrays
    #[error("Signal layout error: {0}")]
    LayoutError(#[from] LayoutError),

    /// Error tagging or reading events
    #[error("Event tag error: {0}")]
    TagError(#[from] TagError),

    /// Error from the store container
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Store has no recording block
    #[error("Store {path} has no '{block}' block")]
    MissingBlock {
        /// Store file
        path: PathBuf,
        /// Expected block name
        block: &'static str,
    },
}

/// Configuration for the recording to sigtree conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    /// Store configuration
    pub store: StoreConfig,
}

impl ConversionConfig {
    /// Configuration optimized for maximum compression (slower conversion)
    pub fn max_compression() -> Self {
        Self {
            store: StoreConfig::max_compression(),
        }
    }

    /// Configuration optimized for fast conversion (larger files)
    pub fn fast_write() -> Self {
        Self {
            store: StoreConfig::fast_write(),
        }
    }

    /// Replace an existing output file
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.store = self.store.with_overwrite(overwrite);
        self
    }
}

/// Converter between recordings and sigtree stores
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    /// Create a new converter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom configuration
    pub fn with_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}

/// A recording decoded from a store
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Channel-major samples with header
    pub signal: SignalMatrix,
    /// Layout the signal was stored in
    pub layout: PhysicalLayout,
    /// Decoded info metadata
    pub info: MetadataMap,
    /// Decoded extra metadata maps, in store order
    pub extras: Vec<MetadataMap>,
    /// Tagged events
    pub events: EventSet,
}

impl Recording {
    /// Convert back into the reader-facing JSON form
    pub fn to_raw(&self) -> RawRecording {
        RawRecording::from_parts(
            &self.signal,
            self.info.to_json(),
            self.extras.iter().map(MetadataMap::to_json).collect(),
            &self.events,
        )
    }
}

mod forward;
mod import;

#[cfg(test)]
mod tests;

pub use import::import;
