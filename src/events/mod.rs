//! # Event Tagger
//!
//! Marks annotation events on the signal arrays with a single multi-tag whose
//! positions and extents are coordinates in the referenced arrays' axes.
//!
//! ## Example
//!
//! ```rust
//! use sigtree::events::{self, Event, EventSet};
//! use sigtree::signal::{self, PhysicalLayout, SignalHeader, SignalMatrix};
//! use sigtree::store::Block;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let header = SignalHeader::new(10.0, vec!["A".into(), "B".into()], "V");
//! let matrix = SignalMatrix::new(header, vec![vec![0.0; 50], vec![1.0; 50]])?;
//!
//! let mut block = Block::new(signal::BLOCK_NAME, signal::BLOCK_TYPE);
//! let handle = signal::write(&mut block, &matrix, PhysicalLayout::Combined)?;
//!
//! let stimuli: EventSet = vec![Event::new(2.0, 0.5, "S1")].into_iter().collect();
//! events::tag(&mut block, &stimuli, PhysicalLayout::Combined, &handle)?;
//!
//! assert_eq!(events::event_samples(&block, 0, "B")?.len(), 5);
//! # Ok(())
//! # }
//! ```

mod error;
mod tagger;
mod types;


pub use error::TagError;
pub use tagger::{
    event_samples, read_events, tag, EXTENTS_NAME, EXTENTS_TYPE, POSITIONS_NAME, POSITIONS_TYPE,
    TAG_NAME, TAG_TYPE,
};
pub use types::{Event, EventSet, TagHandle};
