//! Electrode position files.
//!
//! One electrode per line as `name x y z`; blank lines and lines starting
//! with `#` are ignored.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::{json, Map, Value};

use crate::report::{Diagnostic, Diagnostics};

/// Errors while reading or applying a montage
#[derive(Debug, thiserror::Error)]
pub enum MontageError {
    /// I/O error reading the montage file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line that is not `name x y z`
    #[error("Montage line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Recording info cannot hold channel positions
    #[error("Cannot apply montage: {0}")]
    InvalidInfo(String),
}

/// Ordered electrode positions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Montage {
    positions: Vec<(String, [f64; 3])>,
}

impl Montage {
    /// Read a montage file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MontageError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }

    /// Position of electrode `name`
    pub fn position(&self, name: &str) -> Option<[f64; 3]> {
        self.positions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| *p)
    }

    /// Number of electrodes
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the montage has no electrodes
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Merge positions into `info.chs[i].loc[0..3]`
    ///
    /// Channel entries are matched on `ch_name`. When `info` has no `chs`
    /// list, one entry per channel name is created. Channels without a
    /// position are returned as diagnostics.
    pub fn apply(&self, info: &mut Value, channel_names: &[String]) -> Result<Diagnostics, MontageError> {
        if info.is_null() {
            *info = Value::Object(Map::new());
        }
        let object = info
            .as_object_mut()
            .ok_or_else(|| MontageError::InvalidInfo("info is not an object".to_string()))?;

        let chs = object.entry("chs").or_insert_with(|| {
            Value::Array(
                channel_names
                    .iter()
                    .map(|name| json!({ "ch_name": name }))
                    .collect(),
            )
        });
        let chs = chs
            .as_array_mut()
            .ok_or_else(|| MontageError::InvalidInfo("info.chs is not a list".to_string()))?;

        let mut diagnostics = Diagnostics::new();
        for ch in chs.iter_mut() {
            let Some(ch) = ch.as_object_mut() else {
                return Err(MontageError::InvalidInfo(
                    "info.chs holds a non-object entry".to_string(),
                ));
            };
            let Some(name) = ch.get("ch_name").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            let Some(position) = self.position(&name) else {
                warn!("Channel '{}' has no montage position", name);
                diagnostics.push(Diagnostic::montage_unmatched(name));
                continue;
            };

            match ch.get_mut("loc").and_then(Value::as_array_mut) {
                Some(loc) if loc.len() >= 3 => {
                    for (slot, value) in loc.iter_mut().zip(position) {
                        *slot = json!(value);
                    }
                }
                _ => {
                    ch.insert("loc".to_string(), json!(position));
                }
            }
            debug!("Placed channel '{}' at {:?}", name, position);
        }
        Ok(diagnostics)
    }
}

impl std::str::FromStr for Montage {
    type Err = MontageError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut positions = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [name, x, y, z] = fields.as_slice() else {
                return Err(MontageError::Parse {
                    line: index + 1,
                    reason: format!("expected 'name x y z', found {} fields", fields.len()),
                });
            };
            let mut coords = [0.0; 3];
            for (slot, field) in coords.iter_mut().zip([x, y, z]) {
                *slot = field.parse().map_err(|_| MontageError::Parse {
                    line: index + 1,
                    reason: format!("'{}' is not a number", field),
                })?;
            }
            positions.push((name.to_string(), coords));
        }
        Ok(Self { positions })
    }
}
