use log::{debug, info};

use super::{Event, EventSet, TagError, TagHandle};
use crate::signal::{detect_layout, raw_arrays, PhysicalLayout, SignalHandle};
use crate::store::{Block, DataArray, Dimension, MultiTag};

/// Name of the positions array
pub const POSITIONS_NAME: &str = "Stimuli onset";
/// Type of the positions array
pub const POSITIONS_TYPE: &str = "Stimuli Positions";
/// Name of the extents array
pub const EXTENTS_NAME: &str = "Stimuli Durations";
/// Type of the extents array
pub const EXTENTS_TYPE: &str = "Stimuli Extents";
/// Name of the event tag
pub const TAG_NAME: &str = "Stimuli";
/// Type of the event tag
pub const TAG_TYPE: &str = "EEG Stimuli";

/// Tag `events` over the signal arrays described by `signal`
///
/// `layout` must be the layout the signal was written with. Positions and
/// extents hold one row per event: `(onset,)` / `(duration,)` for split
/// arrays, and for the combined array a coordinate on each axis with the
/// channel axis spanning every channel. An empty event set creates nothing.
pub fn tag(
    block: &mut Block,
    events: &EventSet,
    layout: PhysicalLayout,
    signal: &SignalHandle,
) -> Result<Option<TagHandle>, TagError> {
    if events.is_empty() {
        debug!("No events to tag");
        return Ok(None);
    }

    let written = detect_layout(block)?;
    if written != layout || signal.layout != layout {
        return Err(TagError::LayoutMismatch {
            written,
            requested: layout,
        });
    }

    let (positions, extents, axes) = match (layout, signal.channel_axis) {
        (PhysicalLayout::Split, _) => (
            events.iter().map(|e| e.onset).collect::<Vec<_>>(),
            events.iter().map(|e| e.duration).collect::<Vec<_>>(),
            1,
        ),
        (PhysicalLayout::Combined, Some(channel_axis)) => {
            let last_channel = signal.channels.saturating_sub(1) as f64;
            let mut positions = Vec::with_capacity(events.len() * 2);
            let mut extents = Vec::with_capacity(events.len() * 2);
            for event in events.iter() {
                if channel_axis == 0 {
                    positions.extend([0.0, event.onset]);
                    extents.extend([last_channel, event.duration]);
                } else {
                    positions.extend([event.onset, 0.0]);
                    extents.extend([event.duration, last_channel]);
                }
            }
            (positions, extents, 2)
        }
        (PhysicalLayout::Combined, None) => {
            return Err(TagError::Corrupt(
                "combined signal handle has no channel axis".to_string(),
            ))
        }
    };

    let shape = vec![events.len(), axes];
    let positions_id = create_coordinates(
        block,
        POSITIONS_NAME,
        POSITIONS_TYPE,
        shape.clone(),
        positions,
        events,
    )?;
    let extents_id = create_coordinates(block, EXTENTS_NAME, EXTENTS_TYPE, shape, extents, events)?;

    let tag_id = block.create_multi_tag(TAG_NAME, TAG_TYPE, positions_id)?;
    block.set_tag_extents(tag_id, extents_id)?;

    let references: Vec<_> = raw_arrays(block)?.iter().map(|a| a.id).collect();
    for reference in &references {
        block.add_tag_reference(tag_id, *reference)?;
    }
    block.add_group_multi_tag(signal.group, tag_id)?;

    info!(
        "Tagged {} events over {} signal arrays",
        events.len(),
        references.len()
    );

    Ok(Some(TagHandle {
        tag: tag_id,
        positions: positions_id,
        extents: extents_id,
        events: events.len(),
    }))
}

fn create_coordinates(
    block: &mut Block,
    name: &str,
    type_tag: &str,
    shape: Vec<usize>,
    values: Vec<f64>,
    events: &EventSet,
) -> Result<uuid::Uuid, TagError> {
    let array = block.create_data_array(name, type_tag, shape, values)?;
    array.append_set_dimension(Some(events.labels()))?;
    array.append_set_dimension(None)?;
    Ok(array.id)
}

/// Read the tagged events back, independent of layout
///
/// A block without an event tag yields an empty set.
pub fn read_events(block: &Block) -> Result<EventSet, TagError> {
    let Some(tag) = block.multi_tag_by_name(TAG_NAME) else {
        return Ok(EventSet::new());
    };

    let positions = block.data_array(tag.positions)?;
    let extents = tag.extents.map(|id| block.data_array(id)).transpose()?;
    let &[count, axes] = positions.shape.as_slice() else {
        return Err(TagError::Corrupt(format!(
            "positions have shape {:?}",
            positions.shape
        )));
    };
    let time_axis = time_axis(block, tag)?;
    if time_axis >= axes {
        return Err(TagError::Corrupt(format!(
            "time axis {} outside of {} coordinate axes",
            time_axis, axes
        )));
    }

    let labels = positions
        .dimensions
        .first()
        .and_then(Dimension::labels)
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| vec![String::new(); count]);
    if labels.len() != count {
        return Err(TagError::Corrupt(format!(
            "{} labels for {} events",
            labels.len(),
            count
        )));
    }

    Ok((0..count)
        .zip(labels)
        .map(|(row, label)| {
            let index = row * axes + time_axis;
            Event {
                onset: positions.data()[index],
                duration: extents.map(|e| e.data()[index]).unwrap_or(0.0),
                label,
            }
        })
        .collect())
}

/// Samples of `channel` that overlap event `event_index`
pub fn event_samples(block: &Block, event_index: usize, channel: &str) -> Result<Vec<f64>, TagError> {
    let tag = block
        .multi_tag_by_name(TAG_NAME)
        .ok_or_else(|| TagError::Corrupt(format!("no '{}' tag", TAG_NAME)))?;

    let references = tag
        .references
        .iter()
        .map(|&id| block.data_array(id))
        .collect::<Result<Vec<_>, _>>()?;

    // Split arrays are named after their channel
    if let Some(index) = references
        .iter()
        .position(|a| a.ndim() == 1 && a.name == channel)
    {
        return Ok(block.tagged_data(tag.id, event_index, index)?.data);
    }

    for (index, array) in references.iter().enumerate() {
        if array.ndim() != 2 {
            continue;
        }
        let Some((channel_axis, channel_index)) = channel_position(array, channel) else {
            continue;
        };
        let tagged = block.tagged_data(tag.id, event_index, index)?;
        let range = &tagged.ranges[channel_axis];
        if !range.contains(&channel_index) {
            return Ok(Vec::new());
        }
        let local = channel_index - range.start;
        let samples = if channel_axis == 0 {
            let width = tagged.shape[1];
            tagged.data[local * width..(local + 1) * width].to_vec()
        } else {
            tagged
                .data
                .iter()
                .skip(local)
                .step_by(tagged.shape[1])
                .copied()
                .collect()
        };
        return Ok(samples);
    }

    Err(TagError::UnknownChannel(channel.to_string()))
}

fn channel_position(array: &DataArray, channel: &str) -> Option<(usize, usize)> {
    array.dimensions.iter().enumerate().find_map(|(axis, dim)| {
        dim.labels()?
            .iter()
            .position(|l| l == channel)
            .map(|index| (axis, index))
    })
}

/// Axis of the tag coordinates that holds time
fn time_axis(block: &Block, tag: &MultiTag) -> Result<usize, TagError> {
    let first = tag
        .references
        .first()
        .ok_or_else(|| TagError::Corrupt("tag has no references".to_string()))?;
    let array = block.data_array(*first)?;
    array
        .dimensions
        .iter()
        .position(|d| d.ticks().is_some())
        .ok_or_else(|| TagError::Corrupt(format!("'{}' has no time dimension", array.name)))
}
