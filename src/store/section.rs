use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StoreError;
use crate::value::Scalar;

/// Typed leaf node of the metadata tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the parent section
    pub name: String,
    /// Persisted type tag
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Ordered values, all of one scalar kind
    pub values: Vec<Scalar>,
}

/// One child of a section, kept in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "lowercase")]
pub enum SectionEntry {
    /// Leaf property
    Property(Property),
    /// Nested section
    Section(Section),
}

impl SectionEntry {
    /// Name of the entry
    pub fn name(&self) -> &str {
        match self {
            SectionEntry::Property(p) => &p.name,
            SectionEntry::Section(s) => &s.name,
        }
    }
}

/// Named, typed node of the metadata tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique identifier
    pub id: Uuid,
    /// Name, unique within the parent
    pub name: String,
    /// Section type tag
    #[serde(rename = "type")]
    pub type_tag: String,
    entries: Vec<SectionEntry>,
}

impl Section {
    /// Create a detached section with a fresh id
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            type_tag: type_tag.into(),
            entries: Vec::new(),
        }
    }

    /// Create a child section and return it for further population
    pub fn create_section(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Result<&mut Section, StoreError> {
        let name = name.into();
        self.check_name("section", &name)?;
        self.entries
            .push(SectionEntry::Section(Section::new(name.clone(), type_tag)));

        match self.entries.last_mut() {
            Some(SectionEntry::Section(section)) => Ok(section),
            _ => Err(StoreError::NotFound {
                kind: "section",
                name,
            }),
        }
    }

    /// Create a property holding `values`
    ///
    /// Every value must have the same scalar kind; otherwise
    /// [`StoreError::HeterogeneousValues`] is returned and nothing is stored.
    pub fn create_property(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        values: Vec<Scalar>,
    ) -> Result<&Property, StoreError> {
        let name = name.into();
        self.check_name("property", &name)?;

        let first = match values.first() {
            Some(v) => v.kind(),
            None => return Err(StoreError::EmptyProperty { name }),
        };
        if values.iter().any(|v| v.kind() != first) {
            return Err(StoreError::HeterogeneousValues { name });
        }

        self.entries.push(SectionEntry::Property(Property {
            id: Uuid::new_v4(),
            name: name.clone(),
            type_tag: type_tag.into(),
            values,
        }));

        match self.entries.last() {
            Some(SectionEntry::Property(property)) => Ok(property),
            _ => Err(StoreError::NotFound {
                kind: "property",
                name,
            }),
        }
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    /// Child properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter().filter_map(|e| match e {
            SectionEntry::Property(p) => Some(p),
            SectionEntry::Section(_) => None,
        })
    }

    /// Child sections in insertion order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter().filter_map(|e| match e {
            SectionEntry::Section(s) => Some(s),
            SectionEntry::Property(_) => None,
        })
    }

    /// Child section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections().find(|s| s.name == name)
    }

    /// Child property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties().find(|p| p.name == name)
    }

    /// Search this section and its descendants for `id`
    pub fn find(&self, id: Uuid) -> Option<&Section> {
        if self.id == id {
            return Some(self);
        }
        self.sections().find_map(|s| s.find(id))
    }

    /// Number of sections in this subtree, this one included
    pub fn section_count(&self) -> usize {
        1 + self.sections().map(Section::section_count).sum::<usize>()
    }

    /// Number of properties in this subtree
    pub fn property_count(&self) -> usize {
        self.properties().count()
            + self
                .sections()
                .map(Section::property_count)
                .sum::<usize>()
    }

    fn check_name(&self, kind: &'static str, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidPath(format!("empty {} name", kind)));
        }
        if self.entries.iter().any(|e| e.name() == name) {
            return Err(StoreError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
