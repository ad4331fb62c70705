//! # Metadata Tree Codec
//!
//! Encodes a [`MetadataMap`](crate::value::MetadataMap) into a tree of
//! sections and typed properties, and decodes it back.
//!
//! | Value              | Stored as                                              |
//! |--------------------|--------------------------------------------------------|
//! | `Null`             | skipped                                                |
//! | empty / N-D array  | skipped, diagnostic recorded                           |
//! | `Map`              | child section `key` (`metadata`)                       |
//! | `ListOfMaps`       | child sections `key-0`, `key-1`, ... (`metadata-item`) |
//! | `Composite`        | child section with the composite's tag, plus a linked data array |
//! | scalar / 1-D array | property tagged `int`, `float[]`, ...                  |
//!
//! Decoding is total over the tag tables in [`PropertyType`] and
//! [`SectionKind`]; anything else is a [`DecodeError`].

mod decode;
mod encode;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use decode::decode;
pub use encode::TreeEncoder;
pub use error::{DecodeError, EncodeError};
pub use types::{
    list_item_name, parse_list_item_name, PropertyType, SectionKind, AUX_ARRAY_TYPE,
    PROPERTY_REF, SECTION_LIST_ITEM, SECTION_MAP,
};

use crate::report::Diagnostics;
use crate::store::{Block, Section};
use crate::value::MetadataMap;

/// Encode `map` into `section`, creating auxiliary arrays in `block`
pub fn encode(
    map: &MetadataMap,
    section: &mut Section,
    block: &mut Block,
    diagnostics: &mut Diagnostics,
) -> Result<(), EncodeError> {
    TreeEncoder::new(block, diagnostics).encode(map, section)
}
