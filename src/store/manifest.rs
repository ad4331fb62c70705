use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::Block;
use super::section::Section;

/// Store format version written to the manifest
pub const SIGTREE_FORMAT_VERSION: &str = "1.0.0";

/// MIME type stored as the first container entry
pub const SIGTREE_MIMETYPE: &str = "application/vnd.sigtree";

/// File extension of store containers
pub const SIGTREE_EXTENSION: &str = "sigtree";

pub(super) const MIMETYPE_ENTRY: &str = "mimetype";
pub(super) const MANIFEST_ENTRY: &str = "manifest.json";

/// Path of the payload entry of one data array
pub(super) fn payload_entry(array_id: &uuid::Uuid) -> String {
    format!("arrays/{}.parquet", array_id)
}

/// Serialized entity tree of a store
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Manifest {
    pub format_version: String,
    pub created: DateTime<Utc>,
    pub converter: String,
    pub sections: Vec<Section>,
    pub blocks: Vec<Block>,
}
