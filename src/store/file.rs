use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::arrays::{decode_payload, encode_payload};
use super::block::Block;
use super::manifest::{
    payload_entry, Manifest, MANIFEST_ENTRY, MIMETYPE_ENTRY, SIGTREE_FORMAT_VERSION,
    SIGTREE_MIMETYPE,
};
use super::section::Section;
use super::{StoreConfig, StoreError};

/// Entity counts and size of a written store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Sections in all metadata trees
    pub sections: usize,
    /// Properties in all metadata trees
    pub properties: usize,
    /// Data arrays in all blocks
    pub data_arrays: usize,
    /// Groups in all blocks
    pub groups: usize,
    /// Multi-tags in all blocks
    pub multi_tags: usize,
    /// Size of the container file in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sections, {} properties, {} data arrays, {} groups, {} tags, {} bytes",
            self.sections,
            self.properties,
            self.data_arrays,
            self.groups,
            self.multi_tags,
            self.file_size_bytes
        )
    }
}

enum StoreMode {
    Write {
        config: StoreConfig,
        zip_writer: Option<ZipWriter<BufWriter<File>>>,
    },
    Read,
}

/// Handle to a single-file hierarchical store
///
/// A store created with [`StoreFile::create`] collects sections and blocks in
/// memory and serializes them on [`StoreFile::close`]. A store opened with
/// [`StoreFile::open`] is read-only.
pub struct StoreFile {
    path: PathBuf,
    mode: StoreMode,
    created: DateTime<Utc>,
    converter: String,
    sections: Vec<Section>,
    blocks: Vec<Block>,
}

impl StoreFile {
    /// Create a new store container at `path`
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the file exists and
    /// `config.overwrite` is not set.
    pub fn create<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if path.is_dir() {
            return Err(StoreError::InvalidPath(format!(
                "{} is a directory",
                path.display()
            )));
        }
        if path.exists() && !config.overwrite {
            return Err(StoreError::AlreadyExists(
                path.to_string_lossy().to_string(),
            ));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path)?;
        let mut zip_writer = ZipWriter::new(BufWriter::new(file));

        // mimetype must be the first entry and stored uncompressed
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);
        zip_writer.start_file(MIMETYPE_ENTRY, options)?;
        zip_writer.write_all(SIGTREE_MIMETYPE.as_bytes())?;

        info!("Creating store {}", path.display());

        Ok(Self {
            path,
            mode: StoreMode::Write {
                config,
                zip_writer: Some(zip_writer),
            },
            created: Utc::now(),
            converter: format!("sigtree {}", env!("CARGO_PKG_VERSION")),
            sections: Vec::new(),
            blocks: Vec::new(),
        })
    }

    /// Open an existing store container for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut mimetype = String::new();
        {
            let mut entry = archive.by_index(0)?;
            if entry.name() != MIMETYPE_ENTRY {
                return Err(StoreError::InvalidFormat(format!(
                    "first entry is '{}', expected '{}'",
                    entry.name(),
                    MIMETYPE_ENTRY
                )));
            }
            entry.read_to_string(&mut mimetype)?;
        }
        if mimetype.trim() != SIGTREE_MIMETYPE {
            return Err(StoreError::InvalidFormat(format!(
                "unsupported mimetype '{}'",
                mimetype.trim()
            )));
        }

        let manifest: Manifest = {
            let entry = archive.by_name(MANIFEST_ENTRY).map_err(|_| {
                StoreError::InvalidFormat(format!("container missing {}", MANIFEST_ENTRY))
            })?;
            serde_json::from_reader(entry)?
        };
        if manifest.format_version != SIGTREE_FORMAT_VERSION {
            warn!(
                "Store format version {} differs from supported {}",
                manifest.format_version, SIGTREE_FORMAT_VERSION
            );
        }

        let mut blocks = manifest.blocks;
        for block in &mut blocks {
            for array in block.data_arrays_mut() {
                let entry_name = payload_entry(&array.id);
                let mut entry = archive.by_name(&entry_name).map_err(|_| {
                    StoreError::InvalidFormat(format!("container missing {}", entry_name))
                })?;
                let mut buffer = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut buffer)?;

                let data = decode_payload(Bytes::from(buffer))?;
                let expected: usize = array.shape.iter().product();
                if data.len() != expected {
                    return Err(StoreError::ShapeMismatch {
                        name: array.name.clone(),
                        expected,
                        actual: data.len(),
                    });
                }
                array.data = data;
            }
            validate_block(block)?;
        }

        debug!(
            "Opened store {} with {} sections and {} blocks",
            path.display(),
            manifest.sections.len(),
            blocks.len()
        );

        Ok(Self {
            path,
            mode: StoreMode::Read,
            created: manifest.created,
            converter: manifest.converter,
            sections: manifest.sections,
            blocks,
        })
    }

    /// Path of the container file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creation timestamp
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Name and version of the program that wrote the store
    pub fn converter(&self) -> &str {
        &self.converter
    }

    /// True for stores opened with [`StoreFile::open`]
    pub fn is_read_only(&self) -> bool {
        matches!(self.mode, StoreMode::Read)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match &self.mode {
            StoreMode::Write {
                zip_writer: Some(_),
                ..
            } => Ok(()),
            _ => Err(StoreError::ReadOnly),
        }
    }

    /// Create a top-level section
    pub fn create_section(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Result<&mut Section, StoreError> {
        self.check_writable()?;
        let name = name.into();
        if self.sections.iter().any(|s| s.name == name) {
            return Err(StoreError::DuplicateName {
                kind: "section",
                name,
            });
        }
        self.sections.push(Section::new(name.clone(), type_tag));
        self.sections.last_mut().ok_or(StoreError::NotFound {
            kind: "section",
            name,
        })
    }

    /// Top-level sections in creation order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Top-level section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Create a block
    pub fn create_block(
        &mut self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Result<&mut Block, StoreError> {
        self.check_writable()?;
        let name = name.into();
        if self.blocks.iter().any(|b| b.name == name) {
            return Err(StoreError::DuplicateName {
                kind: "block",
                name,
            });
        }
        self.blocks.push(Block::new(name.clone(), type_tag));
        self.blocks.last_mut().ok_or(StoreError::NotFound {
            kind: "block",
            name,
        })
    }

    /// Blocks in creation order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block by name
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Mutable block by name
    pub fn block_mut(&mut self, name: &str) -> Result<&mut Block, StoreError> {
        self.check_writable()?;
        self.blocks
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| StoreError::NotFound {
                kind: "block",
                name: name.to_string(),
            })
    }

    /// Borrow a top-level section and a block mutably at the same time
    pub fn section_and_block_mut(
        &mut self,
        section: &str,
        block: &str,
    ) -> Result<(&mut Section, &mut Block), StoreError> {
        self.check_writable()?;
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.name == section)
            .ok_or_else(|| StoreError::NotFound {
                kind: "section",
                name: section.to_string(),
            })?;
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.name == block)
            .ok_or_else(|| StoreError::NotFound {
                kind: "block",
                name: block.to_string(),
            })?;
        Ok((section, block))
    }

    /// Entity counts of everything created or loaded so far
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            sections: self.sections.iter().map(Section::section_count).sum(),
            properties: self.sections.iter().map(Section::property_count).sum(),
            data_arrays: self.blocks.iter().map(|b| b.data_arrays().len()).sum(),
            groups: self.blocks.iter().map(|b| b.groups().len()).sum(),
            multi_tags: self.blocks.iter().map(|b| b.multi_tags().len()).sum(),
            file_size_bytes: fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        }
    }

    /// Serialize the store and close the container
    ///
    /// Everything created so far is written, so closing after a failed
    /// conversion leaves a consistent but incomplete store. Closing a
    /// read-only store only reports its statistics.
    pub fn close(mut self) -> Result<StoreStats, StoreError> {
        self.finalize()?;
        Ok(self.stats())
    }

    fn finalize(&mut self) -> Result<(), StoreError> {
        let (config, mut zip_writer) = match &mut self.mode {
            StoreMode::Write { config, zip_writer } => match zip_writer.take() {
                Some(writer) => (config.clone(), writer),
                None => return Ok(()),
            },
            StoreMode::Read => return Ok(()),
        };

        let manifest = Manifest {
            format_version: SIGTREE_FORMAT_VERSION.to_string(),
            created: self.created,
            converter: self.converter.clone(),
            sections: self.sections.clone(),
            blocks: self.blocks.clone(),
        };
        let json_string = serde_json::to_string_pretty(&manifest)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        zip_writer.start_file(MANIFEST_ENTRY, options)?;
        zip_writer.write_all(json_string.as_bytes())?;

        // Payloads are stored uncompressed for seekability
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644);
        for block in &self.blocks {
            for array in block.data_arrays() {
                let payload = encode_payload(&array.name, array.data(), &config)?;
                zip_writer.start_file(payload_entry(&array.id), options)?;
                zip_writer.write_all(&payload)?;
            }
        }

        let inner = zip_writer.finish()?;
        inner.into_inner().map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to flush ZIP buffer: {}", e.error()),
            ))
        })?;

        info!("Closed store {}", self.path.display());
        Ok(())
    }
}

impl Drop for StoreFile {
    fn drop(&mut self) {
        if let StoreMode::Write {
            zip_writer: Some(_),
            ..
        } = self.mode
        {
            warn!(
                "StoreFile {} dropped without calling close(); finalizing now",
                self.path.display()
            );
            if let Err(e) = self.finalize() {
                warn!("Failed to finalize store {}: {}", self.path.display(), e);
            }
        }
    }
}

fn validate_block(block: &Block) -> Result<(), StoreError> {
    for group in block.groups() {
        for id in &group.data_arrays {
            block.data_array(*id).map_err(|_| {
                StoreError::InvalidFormat(format!(
                    "group '{}' references unknown data array {}",
                    group.name, id
                ))
            })?;
        }
        for id in &group.multi_tags {
            block.multi_tag(*id).map_err(|_| {
                StoreError::InvalidFormat(format!(
                    "group '{}' references unknown multi-tag {}",
                    group.name, id
                ))
            })?;
        }
    }
    for tag in block.multi_tags() {
        let referenced = std::iter::once(tag.positions)
            .chain(tag.extents)
            .chain(tag.references.iter().copied());
        for id in referenced {
            block.data_array(id).map_err(|_| {
                StoreError::InvalidFormat(format!(
                    "multi-tag '{}' references unknown data array {}",
                    tag.name, id
                ))
            })?;
        }
        if let Some(extents) = tag.extents {
            let positions = block.data_array(tag.positions)?;
            let extents = block.data_array(extents)?;
            if extents.shape != positions.shape {
                return Err(StoreError::InvalidFormat(format!(
                    "multi-tag '{}' extents shape {:?} differs from positions shape {:?}",
                    tag.name, extents.shape, positions.shape
                )));
            }
        }
    }
    Ok(())
}
