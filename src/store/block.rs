use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dimension::{Dimension, Ticks};
use super::StoreError;

/// Typed N-dimensional array of f64 values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the block
    pub name: String,
    /// Array type
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Physical unit of the values
    pub unit: Option<String>,
    /// Shape, one entry per axis
    pub shape: Vec<usize>,
    /// Dimension descriptors, appended axis by axis
    pub dimensions: Vec<Dimension>,
    /// Id of the section this array belongs to
    pub metadata: Option<Uuid>,
    /// Values in row-major order (persisted as a separate payload)
    #[serde(skip)]
    pub(crate) data: Vec<f64>,
}

impl DataArray {
    /// Values in row-major order
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Set the physical unit
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = Some(unit.into());
    }

    /// Link this array to an owning metadata section
    pub fn set_metadata(&mut self, section_id: Uuid) {
        self.metadata = Some(section_id);
    }

    /// Describe the next axis as a label dimension
    pub fn append_set_dimension(&mut self, labels: Option<Vec<String>>) -> Result<(), StoreError> {
        let dimension = Dimension::Set { labels };
        self.append_dimension(dimension)
    }

    /// Describe the next axis as a range dimension
    pub fn append_range_dimension(
        &mut self,
        ticks: Ticks,
        label: impl Into<String>,
        unit: impl Into<String>,
    ) -> Result<(), StoreError> {
        let dimension = Dimension::Range {
            ticks,
            label: Some(label.into()),
            unit: Some(unit.into()),
        };
        self.append_dimension(dimension)
    }

    fn append_dimension(&mut self, dimension: Dimension) -> Result<(), StoreError> {
        let axis = self.dimensions.len();
        let Some(&length) = self.shape.get(axis) else {
            return Err(StoreError::DimensionMismatch {
                name: self.name.clone(),
                reason: format!("array has only {} axes", self.shape.len()),
            });
        };
        if let Some(count) = dimension.index_count() {
            if count != length {
                return Err(StoreError::DimensionMismatch {
                    name: self.name.clone(),
                    reason: format!("axis {} has length {}, descriptor has {}", axis, length, count),
                });
            }
        }
        self.dimensions.push(dimension);
        Ok(())
    }

    /// Copy out the hyper-slab selected by one index range per axis
    pub fn slab(&self, ranges: &[Range<usize>]) -> Result<Vec<f64>, StoreError> {
        if ranges.len() != self.shape.len() {
            return Err(StoreError::DimensionMismatch {
                name: self.name.clone(),
                reason: format!("{} ranges for {} axes", ranges.len(), self.shape.len()),
            });
        }
        for (range, &len) in ranges.iter().zip(&self.shape) {
            if range.end > len || range.start > range.end {
                return Err(StoreError::OutOfBounds {
                    what: "array axis",
                    index: range.end,
                    len,
                });
            }
        }
        if ranges.iter().any(|r| r.is_empty()) {
            return Ok(Vec::new());
        }

        let mut strides = vec![1usize; self.shape.len()];
        for axis in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }

        let total: usize = ranges.iter().map(|r| r.len()).product();
        let mut out = Vec::with_capacity(total);
        let mut index: Vec<usize> = ranges.iter().map(|r| r.start).collect();
        loop {
            let offset: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
            out.push(self.data[offset]);

            // Odometer increment, last axis fastest
            let mut axis = ranges.len();
            loop {
                if axis == 0 {
                    return Ok(out);
                }
                axis -= 1;
                index[axis] += 1;
                if index[axis] < ranges[axis].end {
                    break;
                }
                index[axis] = ranges[axis].start;
            }
        }
    }
}

/// Ordered collection of data arrays and tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the block
    pub name: String,
    /// Group type
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Member data array ids in insertion order
    pub data_arrays: Vec<Uuid>,
    /// Member multi-tag ids in insertion order
    pub multi_tags: Vec<Uuid>,
}

/// Regions of interest over one or more data arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTag {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the block
    pub name: String,
    /// Tag type
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Data array of positions, shape `(regions, axes)`
    pub positions: Uuid,
    /// Data array of extents, same shape as positions
    pub extents: Option<Uuid>,
    /// Tagged data arrays in insertion order
    pub references: Vec<Uuid>,
}

/// Container of data arrays, groups and tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the file
    pub name: String,
    /// Block type
    #[serde(rename = "type")]
    pub type_tag: String,
    data_arrays: Vec<DataArray>,
    groups: Vec<Group>,
    multi_tags: Vec<MultiTag>,
}

impl Block {
    /// Create an empty, detached block
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            type_tag: type_tag.into(),
            data_arrays: Vec::new(),
            groups: Vec::new(),
            multi_tags: Vec::new(),
        }
    }

    /// Create a data array holding `data` in row-major order
    pub fn create_data_array(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        shape: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<&mut DataArray, StoreError> {
        let name = name.into();
        if self.data_arrays.iter().any(|a| a.name == name) {
            return Err(StoreError::DuplicateName {
                kind: "data array",
                name,
            });
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(StoreError::ShapeMismatch {
                name,
                expected,
                actual: data.len(),
            });
        }

        debug!("Creating data array '{}' with shape {:?}", name, shape);
        self.data_arrays.push(DataArray {
            id: Uuid::new_v4(),
            name: name.clone(),
            type_tag: type_tag.into(),
            unit: None,
            shape,
            dimensions: Vec::new(),
            metadata: None,
            data,
        });
        self.data_arrays
            .last_mut()
            .ok_or(StoreError::NotFound {
                kind: "data array",
                name,
            })
    }

    /// All data arrays in creation order
    pub fn data_arrays(&self) -> &[DataArray] {
        &self.data_arrays
    }

    pub(crate) fn data_arrays_mut(&mut self) -> &mut [DataArray] {
        &mut self.data_arrays
    }

    /// Data array by id
    pub fn data_array(&self, id: Uuid) -> Result<&DataArray, StoreError> {
        self.data_arrays
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found("data array", id))
    }

    /// Data array by name
    pub fn data_array_by_name(&self, name: &str) -> Option<&DataArray> {
        self.data_arrays.iter().find(|a| a.name == name)
    }

    /// Data arrays whose metadata link points at `section_id`
    pub fn linked_data_arrays(&self, section_id: Uuid) -> Vec<&DataArray> {
        self.data_arrays
            .iter()
            .filter(|a| a.metadata == Some(section_id))
            .collect()
    }

    /// Create an empty group and return its id
    pub fn create_group(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Result<Uuid, StoreError> {
        let name = name.into();
        if self.groups.iter().any(|g| g.name == name) {
            return Err(StoreError::DuplicateName { kind: "group", name });
        }
        let id = Uuid::new_v4();
        self.groups.push(Group {
            id,
            name,
            type_tag: type_tag.into(),
            data_arrays: Vec::new(),
            multi_tags: Vec::new(),
        });
        Ok(id)
    }

    /// All groups in creation order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Group by id
    pub fn group(&self, id: Uuid) -> Result<&Group, StoreError> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("group", id))
    }

    /// Group by name
    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    fn group_mut(&mut self, id: Uuid) -> Result<&mut Group, StoreError> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("group", id))
    }

    /// Append a data array to a group's member list
    pub fn add_group_data_array(&mut self, group_id: Uuid, array_id: Uuid) -> Result<(), StoreError> {
        let array_name = self.data_array(array_id)?.name.clone();
        let group = self.group_mut(group_id)?;
        if group.data_arrays.contains(&array_id) {
            return Err(StoreError::DuplicateName {
                kind: "group member",
                name: array_name,
            });
        }
        group.data_arrays.push(array_id);
        Ok(())
    }

    /// Append a multi-tag to a group's member list
    pub fn add_group_multi_tag(&mut self, group_id: Uuid, tag_id: Uuid) -> Result<(), StoreError> {
        let tag_name = self.multi_tag(tag_id)?.name.clone();
        let group = self.group_mut(group_id)?;
        if group.multi_tags.contains(&tag_id) {
            return Err(StoreError::DuplicateName {
                kind: "group member",
                name: tag_name,
            });
        }
        group.multi_tags.push(tag_id);
        Ok(())
    }

    /// Member data arrays of a group, in insertion order
    pub fn group_data_arrays(&self, group_id: Uuid) -> Result<Vec<&DataArray>, StoreError> {
        self.group(group_id)?
            .data_arrays
            .iter()
            .map(|&id| self.data_array(id))
            .collect()
    }

    /// Create a multi-tag over the positions array `positions`
    pub fn create_multi_tag(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        positions: Uuid,
    ) -> Result<Uuid, StoreError> {
        let name = name.into();
        if self.multi_tags.iter().any(|t| t.name == name) {
            return Err(StoreError::DuplicateName {
                kind: "multi-tag",
                name,
            });
        }
        let positions_array = self.data_array(positions)?;
        if positions_array.ndim() != 2 {
            return Err(StoreError::DimensionMismatch {
                name: positions_array.name.clone(),
                reason: "positions must be (regions, axes)".to_string(),
            });
        }

        let id = Uuid::new_v4();
        self.multi_tags.push(MultiTag {
            id,
            name,
            type_tag: type_tag.into(),
            positions,
            extents: None,
            references: Vec::new(),
        });
        Ok(id)
    }

    /// Attach an extents array with the same shape as the positions
    pub fn set_tag_extents(&mut self, tag_id: Uuid, extents: Uuid) -> Result<(), StoreError> {
        let positions = self.data_array(self.multi_tag(tag_id)?.positions)?;
        let extents_array = self.data_array(extents)?;
        if extents_array.shape != positions.shape {
            return Err(StoreError::DimensionMismatch {
                name: extents_array.name.clone(),
                reason: format!(
                    "extents shape {:?} differs from positions shape {:?}",
                    extents_array.shape, positions.shape
                ),
            });
        }
        self.multi_tag_mut(tag_id)?.extents = Some(extents);
        Ok(())
    }

    /// Add a data array to the tag's references
    pub fn add_tag_reference(&mut self, tag_id: Uuid, array_id: Uuid) -> Result<(), StoreError> {
        self.data_array(array_id)?;
        let tag = self.multi_tag_mut(tag_id)?;
        if !tag.references.contains(&array_id) {
            tag.references.push(array_id);
        }
        Ok(())
    }

    /// All multi-tags in creation order
    pub fn multi_tags(&self) -> &[MultiTag] {
        &self.multi_tags
    }

    /// Multi-tag by id
    pub fn multi_tag(&self, id: Uuid) -> Result<&MultiTag, StoreError> {
        self.multi_tags
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("multi-tag", id))
    }

    /// Multi-tag by name
    pub fn multi_tag_by_name(&self, name: &str) -> Option<&MultiTag> {
        self.multi_tags.iter().find(|t| t.name == name)
    }

    fn multi_tag_mut(&mut self, id: Uuid) -> Result<&mut MultiTag, StoreError> {
        self.multi_tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("multi-tag", id))
    }
}

fn not_found(kind: &'static str, id: Uuid) -> StoreError {
    StoreError::NotFound {
        kind,
        name: id.to_string(),
    }
}
