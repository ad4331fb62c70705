use log::{debug, warn};

use super::error::EncodeError;
use super::types::{list_item_name, PropertyType, SectionKind, AUX_ARRAY_TYPE};
use crate::report::{Diagnostic, Diagnostics};
use crate::store::{Block, Section, StoreError};
use crate::value::{
    join_path, ArrayValue, CompositeValue, MetadataMap, MetadataValue, Scalar, ScalarKind,
};

/// Writes metadata maps into section trees
///
/// Auxiliary arrays of composite values are created in `block`; skipped
/// values and coercions are recorded in `diagnostics`.
pub struct TreeEncoder<'a> {
    block: &'a mut Block,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TreeEncoder<'a> {
    /// Create an encoder writing auxiliary arrays into `block`
    pub fn new(block: &'a mut Block, diagnostics: &'a mut Diagnostics) -> Self {
        Self { block, diagnostics }
    }

    /// Encode every entry of `map` into `section`, in map order
    ///
    /// Diagnostic paths start at the section name.
    pub fn encode(&mut self, map: &MetadataMap, section: &mut Section) -> Result<(), EncodeError> {
        let path = section.name.clone();
        self.encode_map(map, section, &path)
    }

    fn encode_map(
        &mut self,
        map: &MetadataMap,
        section: &mut Section,
        path: &str,
    ) -> Result<(), EncodeError> {
        for (key, value) in map.iter() {
            let child = join_path(path, key);
            self.encode_value(key, value, section, &child)?;
        }
        Ok(())
    }

    fn encode_value(
        &mut self,
        key: &str,
        value: &MetadataValue,
        section: &mut Section,
        path: &str,
    ) -> Result<(), EncodeError> {
        match value {
            MetadataValue::Null => {
                debug!("Skipping null value at '{}'", path);
                Ok(())
            }
            MetadataValue::Array(array) if array.is_empty() => {
                self.skip(Diagnostic::skipped_empty(path));
                Ok(())
            }
            MetadataValue::Array(array) if array.ndim() > 1 => {
                self.skip(Diagnostic::skipped_dimensionality(path, array.ndim()));
                Ok(())
            }
            MetadataValue::ListOfMaps(items) if items.is_empty() => {
                self.skip(Diagnostic::skipped_empty(path));
                Ok(())
            }
            MetadataValue::Map(map) => {
                let child = section
                    .create_section(key, SectionKind::Map.tag())
                    .map_err(|e| store_error(path, e))?;
                self.encode_map(map, child, path)
            }
            MetadataValue::ListOfMaps(items) => {
                for (index, item) in items.iter().enumerate() {
                    let name = list_item_name(key, index);
                    let item_path = list_item_name(path, index);
                    let child = section
                        .create_section(name, SectionKind::ListItem.tag())
                        .map_err(|e| store_error(&item_path, e))?;
                    self.encode_map(item, child, &item_path)?;
                }
                Ok(())
            }
            MetadataValue::Composite(composite) => {
                self.encode_composite(key, composite, section, path)
            }
            MetadataValue::Scalar(scalar) => create_property(
                section,
                key,
                PropertyType::Scalar(scalar.kind()),
                vec![scalar.clone()],
                path,
            ),
            MetadataValue::Array(array) => self.encode_array(key, array, section, path),
        }
    }

    fn encode_array(
        &mut self,
        key: &str,
        array: &ArrayValue,
        section: &mut Section,
        path: &str,
    ) -> Result<(), EncodeError> {
        let kind = array
            .leading_kind()
            .ok_or_else(|| EncodeError::Heterogeneous {
                path: path.to_string(),
            })?;

        match section.create_property(
            key,
            PropertyType::Array(kind).tag(),
            array.elements().to_vec(),
        ) {
            Ok(_) => Ok(()),
            Err(StoreError::HeterogeneousValues { .. }) => {
                // Retry once with every element widened to float
                let coerced = array
                    .coerce_to_float()
                    .ok_or_else(|| EncodeError::Heterogeneous {
                        path: path.to_string(),
                    })?;
                debug!("Coerced array at '{}' to float on retry", path);
                self.diagnostics.push(Diagnostic::coerced(path));
                create_property(
                    section,
                    key,
                    PropertyType::Array(ScalarKind::Float),
                    coerced.elements().to_vec(),
                    path,
                )
            }
            Err(e) => Err(store_error(path, e)),
        }
    }

    fn encode_composite(
        &mut self,
        key: &str,
        composite: &CompositeValue,
        section: &mut Section,
        path: &str,
    ) -> Result<(), EncodeError> {
        let child = section
            .create_section(key, SectionKind::Composite(composite.kind).tag())
            .map_err(|e| store_error(path, e))?;
        self.encode_map(&composite.fields, child, path)?;

        if let Some(aux) = &composite.aux {
            let aux_path = join_path(path, &aux.field);
            let array = self
                .block
                .create_data_array(
                    format!("{}.{}", child.id, aux.field),
                    AUX_ARRAY_TYPE,
                    aux.shape.clone(),
                    aux.data.clone(),
                )
                .map_err(|e| store_error(&aux_path, e))?;
            for _ in 0..aux.shape.len() {
                array
                    .append_set_dimension(None)
                    .map_err(|e| store_error(&aux_path, e))?;
            }
            array.set_metadata(child.id);
            let array_id = array.id;

            create_property(
                child,
                &aux.field,
                PropertyType::DataRef,
                vec![Scalar::String(array_id.to_string())],
                &aux_path,
            )?;
        }
        Ok(())
    }

    fn skip(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

fn create_property(
    section: &mut Section,
    key: &str,
    property_type: PropertyType,
    values: Vec<Scalar>,
    path: &str,
) -> Result<(), EncodeError> {
    match section.create_property(key, property_type.tag(), values) {
        Ok(_) => Ok(()),
        Err(StoreError::HeterogeneousValues { .. }) => Err(EncodeError::Heterogeneous {
            path: path.to_string(),
        }),
        Err(e) => Err(store_error(path, e)),
    }
}

fn store_error(path: &str, source: StoreError) -> EncodeError {
    EncodeError::Store {
        path: path.to_string(),
        source,
    }
}
