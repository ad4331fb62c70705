use std::fmt;

use crate::value::{CompositeKind, ScalarKind};

/// Type tag of a map section
pub const SECTION_MAP: &str = "metadata";
/// Type tag of a list element section
pub const SECTION_LIST_ITEM: &str = "metadata-item";
/// Type tag of a property holding a data array id
pub const PROPERTY_REF: &str = "ref";
/// Type of data arrays backing composite values
pub const AUX_ARRAY_TYPE: &str = "Multidimensional Metadata";

/// Kind of value a property encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Single scalar
    Scalar(ScalarKind),
    /// 1-D homogeneous array
    Array(ScalarKind),
    /// Id of a linked data array
    DataRef,
}

impl PropertyType {
    /// Persisted type tag
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyType::Scalar(ScalarKind::Bool) => "bool",
            PropertyType::Scalar(ScalarKind::Int) => "int",
            PropertyType::Scalar(ScalarKind::Float) => "float",
            PropertyType::Scalar(ScalarKind::String) => "string",
            PropertyType::Array(ScalarKind::Bool) => "bool[]",
            PropertyType::Array(ScalarKind::Int) => "int[]",
            PropertyType::Array(ScalarKind::Float) => "float[]",
            PropertyType::Array(ScalarKind::String) => "string[]",
            PropertyType::DataRef => PROPERTY_REF,
        }
    }

    /// Reverse of [`PropertyType::tag`]; `None` for unknown tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == PROPERTY_REF {
            return Some(PropertyType::DataRef);
        }
        ScalarKind::ALL.into_iter().find_map(|kind| {
            if tag == PropertyType::Scalar(kind).tag() {
                Some(PropertyType::Scalar(kind))
            } else if tag == PropertyType::Array(kind).tag() {
                Some(PropertyType::Array(kind))
            } else {
                None
            }
        })
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kind of value a section encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Nested map
    Map,
    /// One element of a list of maps
    ListItem,
    /// Composite domain object
    Composite(CompositeKind),
}

impl SectionKind {
    /// Persisted type tag
    pub fn tag(&self) -> &'static str {
        match self {
            SectionKind::Map => SECTION_MAP,
            SectionKind::ListItem => SECTION_LIST_ITEM,
            SectionKind::Composite(kind) => kind.type_tag(),
        }
    }

    /// Reverse of [`SectionKind::tag`]; `None` for unknown tags
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            SECTION_MAP => Some(SectionKind::Map),
            SECTION_LIST_ITEM => Some(SectionKind::ListItem),
            other => CompositeKind::from_type_tag(other).map(SectionKind::Composite),
        }
    }
}

/// Section name of list element `index` under `key`
pub fn list_item_name(key: &str, index: usize) -> String {
    format!("{}-{}", key, index)
}

/// Split a list element section name into key and index
pub fn parse_list_item_name(name: &str) -> Option<(&str, usize)> {
    let (key, index) = name.rsplit_once('-')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((key, index.parse().ok()?))
}
