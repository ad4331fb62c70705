//! Retrieval of the data a multi-tag points at.

use std::ops::Range;

use uuid::Uuid;

use super::block::{Block, DataArray};
use super::dimension::Dimension;
use super::StoreError;

/// Hyper-slab of a referenced array selected by one tag region
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedData {
    /// Selected index range on each axis
    pub ranges: Vec<Range<usize>>,
    /// Shape of the slab
    pub shape: Vec<usize>,
    /// Slab values in row-major order
    pub data: Vec<f64>,
}

impl Block {
    /// Retrieve the data of reference `reference_index` covered by region `position_index`
    ///
    /// On a set axis the region spans indices `pos ..= pos + ext`. On a range
    /// axis it spans every index whose tick lies in `[pos, pos + ext)`. Without
    /// extents, each axis selects the single index at the position.
    pub fn tagged_data(
        &self,
        tag_id: Uuid,
        position_index: usize,
        reference_index: usize,
    ) -> Result<TaggedData, StoreError> {
        let tag = self.multi_tag(tag_id)?;
        let positions = self.data_array(tag.positions)?;
        let extents = tag.extents.map(|id| self.data_array(id)).transpose()?;

        let &[regions, axes] = positions.shape.as_slice() else {
            return Err(StoreError::DimensionMismatch {
                name: positions.name.clone(),
                reason: "positions must be (regions, axes)".to_string(),
            });
        };
        if position_index >= regions {
            return Err(StoreError::OutOfBounds {
                what: "tag positions",
                index: position_index,
                len: regions,
            });
        }
        let reference_id = *tag
            .references
            .get(reference_index)
            .ok_or(StoreError::OutOfBounds {
                what: "tag references",
                index: reference_index,
                len: tag.references.len(),
            })?;
        let reference = self.data_array(reference_id)?;
        if reference.ndim() != axes {
            return Err(StoreError::DimensionMismatch {
                name: reference.name.clone(),
                reason: format!("tag has {} axes, array has {}", axes, reference.ndim()),
            });
        }

        let row = position_index * axes;
        let ranges = (0..axes)
            .map(|axis| {
                let position = positions.data[row + axis];
                let extent = extents.map(|e| e.data[row + axis]);
                axis_range(reference, axis, position, extent)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = reference.slab(&ranges)?;
        Ok(TaggedData {
            shape: ranges.iter().map(|r| r.len()).collect(),
            ranges,
            data,
        })
    }
}

fn axis_range(
    array: &DataArray,
    axis: usize,
    position: f64,
    extent: Option<f64>,
) -> Result<Range<usize>, StoreError> {
    let length = array.shape[axis];

    match array.dimensions.get(axis) {
        Some(Dimension::Range { ticks, .. }) => {
            let start = ticks.lower_bound(position);
            let end = match extent {
                Some(extent) => ticks.lower_bound(position + extent),
                None => (start + 1).min(length),
            };
            Ok(start..end.max(start))
        }
        // Set dimension or undescribed axis: positions are indices
        Some(Dimension::Set { .. }) | None => {
            if position < 0.0 || !position.is_finite() {
                return Err(StoreError::OutOfBounds {
                    what: "array axis",
                    index: 0,
                    len: length,
                });
            }
            let start = position.round() as usize;
            let end = match extent {
                Some(extent) if extent >= 0.0 => start + extent.round() as usize + 1,
                _ => start + 1,
            };
            if end > length {
                return Err(StoreError::OutOfBounds {
                    what: "array axis",
                    index: end - 1,
                    len: length,
                });
            }
            Ok(start..end)
        }
    }
}
