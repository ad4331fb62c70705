//! # sigtree - Electrophysiology Recordings in a Hierarchical Data Store
//!
//! `sigtree` converts multi-channel electrophysiology recordings (EEG and
//! similar) into a self-describing hierarchical store and reads them back.
//!
//! ## Key Features
//!
//! - **Metadata Tree**: Arbitrarily nested acquisition metadata becomes a tree
//!   of typed properties and sections, with enough type information to
//!   rebuild the original structure.
//!
//! - **Two Signal Layouts**: One 2-D array for all channels, or one 1-D array
//!   per channel; both carry channel labels and a time axis in seconds and
//!   read back to the same channel-major matrix.
//!
//! - **Event Tags**: Annotation events become a tag with positions and
//!   extents in the signal arrays' coordinates, so the samples of any event
//!   can be sliced out of any channel.
//!
//! - **Efficient Storage**: Array payloads are Apache Parquet with ZSTD
//!   compression inside a single ZIP container.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigtree::convert::{import, Converter};
//! use sigtree::recording::RawRecording;
//! use sigtree::signal::PhysicalLayout;
//!
//! let recording = RawRecording::from_path("sub-01.json")?;
//! let report = Converter::new().convert(&recording, "sub-01.sigtree", PhysicalLayout::Combined)?;
//! println!("{}", report);
//!
//! let restored = import("sub-01.sigtree")?;
//! assert_eq!(restored.signal.n_channels(), recording.channel_names.len());
//! # Ok::<(), sigtree::convert::ConvertError>(())
//! ```
//!
//! ## Container Layout
//!
//! ```text
//! sub-01.sigtree (ZIP)
//! ├── mimetype                 # application/vnd.sigtree, stored, first entry
//! ├── manifest.json            # sections, blocks, dimensions, tags
//! └── arrays/{id}.parquet      # one Float64 "value" column per data array
//! ```
//!
//! ## Architecture
//!
//! - [`value`]: Tagged metadata values and their classification
//! - [`store`]: Sections, blocks, data arrays, groups and multi-tags in a container
//! - [`codec`]: Metadata map to section tree and back
//! - [`signal`]: Combined and split signal layouts
//! - [`events`]: Event tags over the signal arrays
//! - [`recording`]: Reader-facing recording format
//! - [`montage`]: Electrode positions
//! - [`convert`]: Forward conversion and import
//! - [`report`]: Diagnostics and conversion report

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod codec;
pub mod convert;
pub mod events;
pub mod montage;
pub mod recording;
pub mod report;
pub mod signal;
pub mod store;
pub mod value;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::convert::{import, ConversionConfig, ConvertError, Converter, Recording};
    pub use crate::events::{Event, EventSet};
    pub use crate::montage::Montage;
    pub use crate::recording::RawRecording;
    pub use crate::report::{ConversionReport, Diagnostic, DiagnosticKind, Diagnostics};
    pub use crate::signal::{PhysicalLayout, SignalHeader, SignalMatrix};
    pub use crate::store::{CompressionType, StoreConfig, StoreFile};
    pub use crate::value::{MetadataMap, MetadataValue, Scalar};
}
