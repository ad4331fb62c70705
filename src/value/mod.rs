//! # Value Model
//!
//! Tagged representation of acquisition metadata. Raw nested structures are
//! classified once at ingestion into [`MetadataValue`]; every later stage
//! (encoding, decoding, export) matches on the tag instead of inspecting
//! runtime types.
//!
//! ```rust
//! use sigtree::value::{classify, MetadataValue, ScalarKind};
//!
//! let value = classify(&serde_json::json!([1, 2.5, 3])).unwrap();
//! match value {
//!     MetadataValue::Array(array) => assert_eq!(array.kind(), Some(ScalarKind::Float)),
//!     other => panic!("unexpected {}", other.variant_name()),
//! }
//! ```

mod classify;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use classify::{classify, classify_at, classify_map, dimensionality, join_path};
pub use error::ValueError;
pub use types::{
    ArrayValue, AuxArray, CompositeKind, CompositeValue, MetadataMap, MetadataValue, Scalar,
    ScalarKind,
};
