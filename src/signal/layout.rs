use log::{debug, info};

use super::types::{
    normalize, oriented, transpose, AxisOrder, SampleBuffer, SignalHeader, SignalMatrix,
};
use super::{LayoutError, PhysicalLayout, SignalHandle};
use crate::store::{Block, DataArray, Dimension, Ticks};

/// Name of the block holding the recording
pub const BLOCK_NAME: &str = "EEG Data Block";
/// Type of the block holding the recording
pub const BLOCK_TYPE: &str = "Recording";
/// Name of the group aggregating raw data arrays
pub const GROUP_NAME: &str = "Raw Data Group";
/// Type of the raw data group
pub const GROUP_TYPE: &str = "EEG Channels";
/// Type of every raw signal array
pub const RAW_DATA_TYPE: &str = "Raw Data";
/// Name of the single array in the combined layout
pub const COMBINED_ARRAY_NAME: &str = "EEG Data";
/// Label of the time dimension
pub const TIME_LABEL: &str = "Time";
/// Unit of the time dimension
pub const TIME_UNIT: &str = "s";

/// Write a channel-major matrix in the requested layout
pub fn write(
    block: &mut Block,
    matrix: &SignalMatrix,
    layout: PhysicalLayout,
) -> Result<SignalHandle, LayoutError> {
    write_raw(block, matrix, AxisOrder::ChannelsFirst, layout)
}

/// Write a buffer as produced by a recording reader
///
/// The combined layout keeps the orientation found in the buffer.
pub fn write_buffer(
    block: &mut Block,
    header: SignalHeader,
    buffer: &SampleBuffer,
    samples: usize,
    layout: PhysicalLayout,
) -> Result<SignalHandle, LayoutError> {
    let (matrix, order) = normalize(header, buffer, samples)?;
    write_raw(block, &matrix, order, layout)
}

fn write_raw(
    block: &mut Block,
    matrix: &SignalMatrix,
    order: AxisOrder,
    layout: PhysicalLayout,
) -> Result<SignalHandle, LayoutError> {
    matrix.header().validate()?;
    let group = block.create_group(GROUP_NAME, GROUP_TYPE)?;
    let ticks = Ticks::uniform(matrix.sample_rate(), matrix.n_samples());

    let (arrays, channel_axis) = match layout {
        PhysicalLayout::Combined => {
            let (shape, data) = match order {
                AxisOrder::ChannelsFirst => (
                    vec![matrix.n_channels(), matrix.n_samples()],
                    matrix.samples().to_vec(),
                ),
                AxisOrder::SamplesFirst => (
                    vec![matrix.n_samples(), matrix.n_channels()],
                    transpose(matrix.samples(), [matrix.n_channels(), matrix.n_samples()]),
                ),
            };

            let array = block.create_data_array(COMBINED_ARRAY_NAME, RAW_DATA_TYPE, shape, data)?;
            array.set_unit(matrix.unit());
            let labels = Some(matrix.channel_names().to_vec());
            match order {
                AxisOrder::ChannelsFirst => {
                    array.append_set_dimension(labels)?;
                    array.append_range_dimension(ticks, TIME_LABEL, TIME_UNIT)?;
                }
                AxisOrder::SamplesFirst => {
                    array.append_range_dimension(ticks, TIME_LABEL, TIME_UNIT)?;
                    array.append_set_dimension(labels)?;
                }
            }
            let id = array.id;
            block.add_group_data_array(group, id)?;
            (vec![id], Some(order.channel_axis()))
        }
        PhysicalLayout::Split => {
            let mut arrays = Vec::with_capacity(matrix.n_channels());
            for (index, name) in matrix.channel_names().iter().enumerate() {
                let samples = matrix.channel(index).unwrap_or_default().to_vec();
                let array = block.create_data_array(
                    name.clone(),
                    RAW_DATA_TYPE,
                    vec![samples.len()],
                    samples,
                )?;
                array.set_unit(matrix.unit());
                array.append_range_dimension(ticks.clone(), TIME_LABEL, TIME_UNIT)?;
                let id = array.id;

                // Group order is the channel order on read
                block.add_group_data_array(group, id)?;
                arrays.push(id);
                debug!("Wrote channel '{}' as its own array", name);
            }
            (arrays, None)
        }
    };

    info!(
        "Wrote {} channels x {} samples in {} layout",
        matrix.n_channels(),
        matrix.n_samples(),
        layout
    );

    Ok(SignalHandle {
        layout,
        group,
        arrays,
        channel_axis,
        channels: matrix.n_channels(),
        samples: matrix.n_samples(),
    })
}

/// Raw data arrays of the block's raw data group, in group order
pub fn raw_arrays(block: &Block) -> Result<Vec<&DataArray>, LayoutError> {
    let group = block
        .group_by_name(GROUP_NAME)
        .ok_or_else(|| LayoutError::Corrupt(format!("no '{}' group", GROUP_NAME)))?;
    let arrays: Vec<&DataArray> = block
        .group_data_arrays(group.id)?
        .into_iter()
        .filter(|a| a.type_tag == RAW_DATA_TYPE)
        .collect();
    if arrays.is_empty() {
        return Err(LayoutError::Corrupt(format!(
            "'{}' has no raw data arrays",
            GROUP_NAME
        )));
    }
    Ok(arrays)
}

/// Detect which layout the block was written with
pub fn detect_layout(block: &Block) -> Result<PhysicalLayout, LayoutError> {
    let arrays = raw_arrays(block)?;
    Ok(match arrays.as_slice() {
        [single] if single.ndim() == 2 => PhysicalLayout::Combined,
        _ => PhysicalLayout::Split,
    })
}

/// Rebuild the signal matrix from either layout
pub fn read(block: &Block) -> Result<SignalMatrix, LayoutError> {
    let arrays = raw_arrays(block)?;
    match arrays.as_slice() {
        [single] if single.ndim() == 2 => read_combined(single),
        members => read_split(members),
    }
}

fn read_combined(array: &DataArray) -> Result<SignalMatrix, LayoutError> {
    let channel_axis = array
        .dimensions
        .iter()
        .position(Dimension::is_set)
        .ok_or_else(|| corrupt(array, "no channel label dimension"))?;
    let time_axis = 1 - channel_axis;

    let names = array.dimensions[channel_axis]
        .labels()
        .ok_or_else(|| corrupt(array, "channel dimension has no labels"))?
        .to_vec();
    let ticks = array
        .dimensions
        .get(time_axis)
        .and_then(Dimension::ticks)
        .ok_or_else(|| corrupt(array, "no time range dimension"))?;
    let sample_rate = rate_of(ticks).ok_or_else(|| corrupt(array, "cannot recover sample rate"))?;

    let shape = [array.shape[0], array.shape[1]];
    let order = if channel_axis == 0 {
        AxisOrder::ChannelsFirst
    } else {
        AxisOrder::SamplesFirst
    };
    let header = SignalHeader::new(sample_rate, names, array.unit.clone().unwrap_or_default());
    let buffer = SampleBuffer::new(shape, array.data().to_vec())?;

    oriented(header, &buffer, order)
}

fn read_split(members: &[&DataArray]) -> Result<SignalMatrix, LayoutError> {
    let first = members
        .first()
        .ok_or_else(|| LayoutError::Corrupt("no channel arrays".to_string()))?;

    let mut rate = None;
    let mut rows = Vec::with_capacity(members.len());
    let mut names = Vec::with_capacity(members.len());
    for array in members {
        if array.ndim() != 1 {
            return Err(corrupt(array, "split member is not 1-D"));
        }
        let ticks = array
            .dimensions
            .first()
            .and_then(Dimension::ticks)
            .ok_or_else(|| corrupt(array, "split member has no time range dimension"))?;
        let member_rate =
            rate_of(ticks).ok_or_else(|| corrupt(array, "cannot recover sample rate"))?;
        match rate {
            None => rate = Some(member_rate),
            Some(r) if r != member_rate => {
                return Err(corrupt(array, "sample rate differs between channels"))
            }
            Some(_) => {}
        }
        if array.shape[0] != first.shape[0] {
            return Err(corrupt(array, "channel lengths differ"));
        }
        names.push(array.name.clone());
        rows.push(array.data().to_vec());
    }

    let header = SignalHeader::new(
        rate.unwrap_or_default(),
        names,
        first.unit.clone().unwrap_or_default(),
    );
    SignalMatrix::new(header, rows)
}

fn rate_of(ticks: &Ticks) -> Option<f64> {
    match ticks {
        Ticks::Uniform { rate, .. } => Some(*rate),
        Ticks::Explicit { values } => match values.as_slice() {
            [t0, t1, ..] if t1 > t0 => Some(1.0 / (t1 - t0)),
            _ => None,
        },
    }
}

fn corrupt(array: &DataArray, reason: &str) -> LayoutError {
    LayoutError::Corrupt(format!("'{}': {}", array.name, reason))
}
