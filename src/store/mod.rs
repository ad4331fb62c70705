//! # Hierarchical Store
//!
//! In-crate structured store holding metadata trees, typed N-D data arrays
//! with dimension descriptors, groups and multi-tags, persisted as a single
//! ZIP container.
//!
//! ## Container Structure
//!
//! ```text
//! {name}.sigtree
//! ├── mimetype                       # "application/vnd.sigtree" (stored, first entry)
//! ├── manifest.json                  # sections, blocks, groups, tags, dimensions
//! └── arrays/{data-array-id}.parquet # one f64 payload per data array (stored)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sigtree::store::{StoreConfig, StoreFile, Ticks};
//! use sigtree::value::Scalar;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = StoreFile::create("recording.sigtree", StoreConfig::default())?;
//!
//! let info = store.create_section("Info", "File metadata")?;
//! info.create_property("sfreq", "float", vec![Scalar::Float(256.0)])?;
//!
//! let block = store.create_block("EEG Data Block", "Recording")?;
//! let array = block.create_data_array("Fp1", "Raw Data", vec![4], vec![0.0; 4])?;
//! array.append_range_dimension(Ticks::uniform(256.0, 4), "Time", "s")?;
//!
//! let stats = store.close()?;
//! println!("{}", stats);
//! # Ok(())
//! # }
//! ```

mod arrays;
mod block;
mod config;
mod dimension;
mod error;
mod file;
mod manifest;
mod section;
mod tagged;


pub use block::{Block, DataArray, Group, MultiTag};
pub use config::{CompressionType, StoreConfig};
pub use dimension::{Dimension, Ticks};
pub use error::StoreError;
pub use file::{StoreFile, StoreStats};
pub use manifest::{SIGTREE_EXTENSION, SIGTREE_FORMAT_VERSION, SIGTREE_MIMETYPE};
pub use section::{Property, Section, SectionEntry};
pub use tagged::TaggedData;
