use std::path::Path;

use log::{debug, info, warn};

use super::{ConvertError, Converter, EXTRAS_SECTION, EXTRAS_TYPE, INFO_SECTION, INFO_TYPE};
use crate::codec;
use crate::events;
use crate::montage::Montage;
use crate::recording::RawRecording;
use crate::report::{ConversionReport, Diagnostics};
use crate::signal::{self, PhysicalLayout, BLOCK_NAME, BLOCK_TYPE};
use crate::store::StoreFile;
use crate::value::classify_map;

/// Counts of what went into the store
struct Written {
    channels: usize,
    samples: usize,
    events: usize,
}

impl Converter {
    /// Convert a recording into a sigtree store at `output_path`
    ///
    /// The store is closed on every exit path. On failure the partially
    /// written store is left on disk and the conversion error is returned.
    pub fn convert<P: AsRef<Path>>(
        &self,
        recording: &RawRecording,
        output_path: P,
        layout: PhysicalLayout,
    ) -> Result<ConversionReport, ConvertError> {
        self.convert_with_diagnostics(recording, output_path.as_ref(), layout, Diagnostics::new())
    }

    /// Read a recording JSON file, apply an optional montage and convert it
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        montage_path: Option<&Path>,
        output_path: Q,
        layout: PhysicalLayout,
    ) -> Result<ConversionReport, ConvertError> {
        let input_path = input_path.as_ref();
        info!("Reading recording {}", input_path.display());
        let mut recording = RawRecording::from_path(input_path)?;

        let mut diagnostics = Diagnostics::new();
        if let Some(montage_path) = montage_path {
            let montage = Montage::from_path(montage_path)?;
            info!(
                "Applying montage {} ({} electrodes)",
                montage_path.display(),
                montage.len()
            );
            diagnostics.extend(montage.apply(&mut recording.info, &recording.channel_names)?);
        }

        self.convert_with_diagnostics(&recording, output_path.as_ref(), layout, diagnostics)
    }

    fn convert_with_diagnostics(
        &self,
        recording: &RawRecording,
        output_path: &Path,
        layout: PhysicalLayout,
        mut diagnostics: Diagnostics,
    ) -> Result<ConversionReport, ConvertError> {
        info!(
            "Converting {} channels to {} ({} layout)",
            recording.channel_names.len(),
            output_path.display(),
            layout
        );

        let mut store = StoreFile::create(output_path, self.config.store.clone())?;
        let result = write_recording(&mut store, recording, layout, &mut diagnostics);
        let closed = store.close();

        let written = match result {
            Ok(written) => written,
            Err(e) => {
                if let Err(close_error) = closed {
                    warn!("Failed to close store after error: {}", close_error);
                }
                return Err(e);
            }
        };
        let stats = closed?;

        info!("Conversion complete: {}", stats);
        if !diagnostics.is_empty() {
            warn!("{} diagnostics recorded during conversion", diagnostics.len());
        }

        Ok(ConversionReport {
            output: output_path.to_path_buf(),
            layout,
            channels: written.channels,
            samples: written.samples,
            events: written.events,
            store: stats,
            diagnostics,
        })
    }
}

fn write_recording(
    store: &mut StoreFile,
    recording: &RawRecording,
    layout: PhysicalLayout,
    diagnostics: &mut Diagnostics,
) -> Result<Written, ConvertError> {
    store.create_block(BLOCK_NAME, BLOCK_TYPE)?;

    let info = classify_map(INFO_SECTION, &recording.info, diagnostics)?;
    store.create_section(INFO_SECTION, INFO_TYPE)?;
    let (section, block) = store.section_and_block_mut(INFO_SECTION, BLOCK_NAME)?;
    codec::encode(&info, section, block, diagnostics)?;
    debug!("Wrote {} info keys", info.len());

    for (index, raw) in recording.extras.iter().enumerate() {
        let name = if recording.extras.len() == 1 {
            EXTRAS_SECTION.to_string()
        } else {
            format!("{}-{}", EXTRAS_SECTION, index)
        };
        let extras = classify_map(&name, raw, diagnostics)?;
        store.create_section(name.as_str(), EXTRAS_TYPE)?;
        let (section, block) = store.section_and_block_mut(&name, BLOCK_NAME)?;
        codec::encode(&extras, section, block, diagnostics)?;
        debug!("Wrote {} keys to '{}'", extras.len(), name);
    }

    let buffer = recording.buffer()?;
    let block = store.block_mut(BLOCK_NAME)?;
    let handle = signal::write_buffer(
        block,
        recording.header(),
        &buffer,
        recording.samples(),
        layout,
    )?;

    let events = recording.events();
    events::tag(block, &events, layout, &handle)?;

    Ok(Written {
        channels: handle.channels,
        samples: handle.samples,
        events: events.len(),
    })
}
