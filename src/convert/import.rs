use std::path::Path;

use log::info;

use super::{ConvertError, Recording, EXTRAS_TYPE, INFO_SECTION};
use crate::codec::decode;
use crate::events::read_events;
use crate::signal::{self, BLOCK_NAME};
use crate::store::StoreFile;
use crate::value::MetadataMap;

/// Read a sigtree store back into a [`Recording`]
///
/// A store without an info section yields an empty info map.
pub fn import<P: AsRef<Path>>(path: P) -> Result<Recording, ConvertError> {
    let path = path.as_ref();
    info!("Importing {}", path.display());

    let store = StoreFile::open(path)?;
    let block = store.block(BLOCK_NAME).ok_or_else(|| ConvertError::MissingBlock {
        path: path.to_path_buf(),
        block: BLOCK_NAME,
    })?;

    let info = match store.section(INFO_SECTION) {
        Some(section) => decode(section, Some(block))?,
        None => MetadataMap::new(),
    };
    let extras = store
        .sections()
        .iter()
        .filter(|s| s.type_tag == EXTRAS_TYPE)
        .map(|s| decode(s, Some(block)))
        .collect::<Result<Vec<_>, _>>()?;

    let layout = signal::detect_layout(block)?;
    let signal = signal::read(block)?;
    let events = read_events(block)?;

    info!(
        "Imported {} channels x {} samples, {} events ({} layout)",
        signal.n_channels(),
        signal.n_samples(),
        events.len(),
        layout
    );

    Ok(Recording {
        signal,
        layout,
        info,
        extras,
        events,
    })
}
