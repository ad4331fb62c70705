use uuid::Uuid;

use super::error::DecodeError;
use super::types::{list_item_name, parse_list_item_name, PropertyType, SectionKind};
use crate::store::{Block, Property, Section, SectionEntry};
use crate::value::{
    join_path, ArrayValue, AuxArray, CompositeKind, CompositeValue, MetadataMap, MetadataValue,
};

/// Read a section tree back into a metadata map
///
/// `block` resolves the auxiliary arrays of composite sections; a tree
/// without composites can be decoded without one. The store is never
/// modified.
pub fn decode(section: &Section, block: Option<&Block>) -> Result<MetadataMap, DecodeError> {
    TreeDecoder { block }.decode_map(section, &section.name)
}

struct TreeDecoder<'a> {
    block: Option<&'a Block>,
}

impl TreeDecoder<'_> {
    fn decode_map(&self, section: &Section, path: &str) -> Result<MetadataMap, DecodeError> {
        self.decode_entries(section, path, None)
    }

    /// Decode every entry of `section`; data references are resolved into
    /// `aux` when a slot is given and rejected otherwise
    fn decode_entries(
        &self,
        section: &Section,
        path: &str,
        mut aux: Option<&mut Option<AuxArray>>,
    ) -> Result<MetadataMap, DecodeError> {
        let mut map = MetadataMap::new();
        let entries = section.entries();
        let mut index = 0;

        while index < entries.len() {
            let (key, value, consumed) = match &entries[index] {
                SectionEntry::Property(property) => {
                    let key_path = join_path(path, &property.name);
                    if let Some(slot) = aux.as_deref_mut() {
                        if property.type_tag == PropertyType::DataRef.tag() {
                            *slot = Some(self.resolve_aux(section, property, &key_path)?);
                            index += 1;
                            continue;
                        }
                    }
                    let value = decode_property(property, &key_path)?;
                    (property.name.as_str(), value, 1)
                }
                SectionEntry::Section(child) => {
                    let key_path = join_path(path, &child.name);
                    match section_kind(child, &key_path)? {
                        SectionKind::Map => {
                            let value = MetadataValue::Map(self.decode_map(child, &key_path)?);
                            (child.name.as_str(), value, 1)
                        }
                        SectionKind::Composite(kind) => {
                            let value = self.decode_composite(kind, child, &key_path)?;
                            (child.name.as_str(), value, 1)
                        }
                        SectionKind::ListItem => {
                            self.decode_list(&entries[index..], path, &key_path)?
                        }
                    }
                }
            };

            if map.insert(key, value).is_some() {
                return Err(DecodeError::DuplicateKey {
                    path: join_path(path, key),
                });
            }
            index += consumed;
        }
        Ok(map)
    }

    /// Collect consecutive `{key}-0`, `{key}-1`, ... list item sections
    fn decode_list<'e>(
        &self,
        entries: &'e [SectionEntry],
        parent_path: &str,
        first_path: &str,
    ) -> Result<(&'e str, MetadataValue, usize), DecodeError> {
        let key = match entries.first() {
            Some(SectionEntry::Section(first)) => match parse_list_item_name(&first.name) {
                Some((key, 0)) => key,
                _ => {
                    return Err(DecodeError::OrphanListItem {
                        path: first_path.to_string(),
                    })
                }
            },
            _ => {
                return Err(DecodeError::OrphanListItem {
                    path: first_path.to_string(),
                })
            }
        };

        let mut items = Vec::new();
        for entry in entries {
            let SectionEntry::Section(item) = entry else {
                break;
            };
            if item.type_tag != SectionKind::ListItem.tag()
                || item.name != list_item_name(key, items.len())
            {
                break;
            }
            let item_path = join_path(parent_path, &item.name);
            items.push(self.decode_map(item, &item_path)?);
        }

        let consumed = items.len();
        Ok((key, MetadataValue::ListOfMaps(items), consumed))
    }

    fn decode_composite(
        &self,
        kind: CompositeKind,
        section: &Section,
        path: &str,
    ) -> Result<MetadataValue, DecodeError> {
        let mut aux = None;
        let fields = self.decode_entries(section, path, Some(&mut aux))?;
        Ok(MetadataValue::Composite(CompositeValue { kind, fields, aux }))
    }

    fn resolve_aux(
        &self,
        section: &Section,
        property: &Property,
        path: &str,
    ) -> Result<AuxArray, DecodeError> {
        let invalid = |reason: String| DecodeError::InvalidReference {
            path: path.to_string(),
            reason,
        };

        let block = self
            .block
            .ok_or_else(|| invalid("no data block to resolve against".to_string()))?;
        let id = match property.values.as_slice() {
            [value] => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| invalid(format!("'{}' is not an array id", value)))?,
            values => return Err(invalid(format!("expected one id, found {}", values.len()))),
        };

        let array = block
            .linked_data_arrays(section.id)
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| invalid(format!("array {} is not linked to this section", id)))?;

        Ok(AuxArray {
            field: property.name.clone(),
            shape: array.shape.clone(),
            data: array.data().to_vec(),
        })
    }
}

fn section_kind(section: &Section, path: &str) -> Result<SectionKind, DecodeError> {
    SectionKind::from_tag(&section.type_tag).ok_or_else(|| DecodeError::UnknownSectionType {
        path: path.to_string(),
        tag: section.type_tag.clone(),
    })
}

fn decode_property(property: &Property, path: &str) -> Result<MetadataValue, DecodeError> {
    let property_type =
        PropertyType::from_tag(&property.type_tag).ok_or_else(|| DecodeError::UnknownType {
            path: path.to_string(),
            tag: property.type_tag.clone(),
        })?;

    let mismatch = |found: String| DecodeError::TypeMismatch {
        path: path.to_string(),
        expected: property.type_tag.clone(),
        found,
    };

    match property_type {
        PropertyType::Scalar(kind) => match property.values.as_slice() {
            [value] if value.kind() == kind => Ok(MetadataValue::Scalar(value.clone())),
            [value] => Err(mismatch(value.kind().to_string())),
            values => Err(mismatch(format!("{} values", values.len()))),
        },
        PropertyType::Array(kind) => {
            if let Some(value) = property.values.iter().find(|v| v.kind() != kind) {
                return Err(mismatch(format!("a {} element", value.kind())));
            }
            Ok(MetadataValue::Array(ArrayValue::new(property.values.clone())))
        }
        PropertyType::DataRef => Err(DecodeError::InvalidReference {
            path: path.to_string(),
            reason: "data reference outside of a composite section".to_string(),
        }),
    }
}
