use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LayoutError;

/// Physical arrangement of the sample arrays in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalLayout {
    /// One 2-D array with a channel label axis and a time axis
    Combined,
    /// One 1-D array per channel, aggregated in a group
    Split,
}

impl PhysicalLayout {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicalLayout::Combined => "combined",
            PhysicalLayout::Split => "split",
        }
    }
}

impl fmt::Display for PhysicalLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orientation of a 2-D sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// `(channels, samples)`
    ChannelsFirst,
    /// `(samples, channels)`
    SamplesFirst,
}

impl AxisOrder {
    /// Index of the channel axis
    pub fn channel_axis(&self) -> usize {
        match self {
            AxisOrder::ChannelsFirst => 0,
            AxisOrder::SamplesFirst => 1,
        }
    }

    /// Index of the time axis
    pub fn time_axis(&self) -> usize {
        1 - self.channel_axis()
    }
}

/// Decide which axis of `shape` holds channels and which holds samples
///
/// The time axis is axis 1 when its length equals the sample count, otherwise
/// axis 0. The remaining axis must equal the channel count. A square buffer
/// is therefore always read as `(channels, samples)`.
pub fn locate_axes(
    shape: [usize; 2],
    channels: usize,
    samples: usize,
) -> Result<AxisOrder, LayoutError> {
    let order = if shape[1] == samples {
        AxisOrder::ChannelsFirst
    } else {
        AxisOrder::SamplesFirst
    };
    if shape[order.channel_axis()] != channels || shape[order.time_axis()] != samples {
        return Err(LayoutError::ShapeMismatch {
            shape,
            channels,
            samples,
        });
    }
    Ok(order)
}

/// Sample rate, channel identity and unit of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHeader {
    /// Samples per second
    pub sample_rate: f64,
    /// Unique channel names in channel order
    pub channel_names: Vec<String>,
    /// Physical unit of the samples
    pub unit: String,
}

impl SignalHeader {
    /// Create a header
    pub fn new(sample_rate: f64, channel_names: Vec<String>, unit: impl Into<String>) -> Self {
        Self {
            sample_rate,
            channel_names,
            unit: unit.into(),
        }
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channel_names.len()
    }

    /// Check rate and channel names
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(LayoutError::InvalidHeader(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.channel_names.is_empty() {
            return Err(LayoutError::InvalidHeader("no channels".to_string()));
        }
        let mut seen = HashSet::new();
        for name in &self.channel_names {
            if name.is_empty() {
                return Err(LayoutError::InvalidHeader("empty channel name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(LayoutError::InvalidHeader(format!(
                    "duplicate channel name '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// 2-D sample buffer in the orientation a recording reader produced
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Buffer shape
    pub shape: [usize; 2],
    /// Values in row-major order
    pub values: Vec<f64>,
}

impl SampleBuffer {
    /// Create a buffer, checking that `values` fills `shape`
    pub fn new(shape: [usize; 2], values: Vec<f64>) -> Result<Self, LayoutError> {
        if shape[0] * shape[1] != values.len() {
            return Err(LayoutError::Corrupt(format!(
                "buffer of shape {:?} needs {} values, got {}",
                shape,
                shape[0] * shape[1],
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    /// Buffer from nested rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, LayoutError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(LayoutError::Corrupt("rows have different lengths".to_string()));
        }
        Self::new([rows.len(), width], rows.concat())
    }

    /// Copy into channel-major order
    pub fn to_channel_major(&self, order: AxisOrder) -> Vec<f64> {
        match order {
            AxisOrder::ChannelsFirst => self.values.clone(),
            AxisOrder::SamplesFirst => transpose(&self.values, self.shape),
        }
    }
}

/// Transpose a row-major `shape` matrix
pub(crate) fn transpose(values: &[f64], shape: [usize; 2]) -> Vec<f64> {
    let [rows, cols] = shape;
    let mut out = Vec::with_capacity(values.len());
    for c in 0..cols {
        for r in 0..rows {
            out.push(values[r * cols + c]);
        }
    }
    out
}

/// Channel-major sample matrix with its header
///
/// Immutable once built; construction validates the header and that every
/// channel has the same number of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    header: SignalHeader,
    samples_per_channel: usize,
    samples: Vec<f64>,
}

impl SignalMatrix {
    /// Build from one row of samples per channel
    pub fn new(header: SignalHeader, rows: Vec<Vec<f64>>) -> Result<Self, LayoutError> {
        if rows.len() != header.channel_count() {
            return Err(LayoutError::InvalidHeader(format!(
                "{} channel names for {} rows",
                header.channel_count(),
                rows.len()
            )));
        }
        let buffer = SampleBuffer::from_rows(&rows)?;
        Self::from_buffer(header, &buffer, buffer.shape[1])
    }

    /// Build from a buffer in either orientation holding `samples` per channel
    pub fn from_buffer(
        header: SignalHeader,
        buffer: &SampleBuffer,
        samples: usize,
    ) -> Result<Self, LayoutError> {
        let (matrix, _) = normalize(header, buffer, samples)?;
        Ok(matrix)
    }

    /// Header of the recording
    pub fn header(&self) -> &SignalHeader {
        &self.header
    }

    /// Samples per second
    pub fn sample_rate(&self) -> f64 {
        self.header.sample_rate
    }

    /// Channel names in channel order
    pub fn channel_names(&self) -> &[String] {
        &self.header.channel_names
    }

    /// Physical unit
    pub fn unit(&self) -> &str {
        &self.header.unit
    }

    /// Number of channels
    pub fn n_channels(&self) -> usize {
        self.header.channel_count()
    }

    /// Samples per channel
    pub fn n_samples(&self) -> usize {
        self.samples_per_channel
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        let n = self.samples_per_channel;
        (index < self.n_channels()).then(|| &self.samples[index * n..(index + 1) * n])
    }

    /// Samples of the channel named `name`
    pub fn channel_by_name(&self, name: &str) -> Option<&[f64]> {
        let index = self.channel_names().iter().position(|c| c == name)?;
        self.channel(index)
    }

    /// All samples in channel-major order
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples_per_channel as f64 / self.header.sample_rate
    }
}

/// Turn a buffer of either orientation into a channel-major matrix
///
/// Also returns the orientation that was found, so a writer can keep it.
pub fn normalize(
    header: SignalHeader,
    buffer: &SampleBuffer,
    samples: usize,
) -> Result<(SignalMatrix, AxisOrder), LayoutError> {
    let order = locate_axes(buffer.shape, header.channel_count(), samples)?;
    let matrix = oriented(header, buffer, order)?;
    Ok((matrix, order))
}

/// Build a matrix from a buffer whose orientation is already known
pub(super) fn oriented(
    header: SignalHeader,
    buffer: &SampleBuffer,
    order: AxisOrder,
) -> Result<SignalMatrix, LayoutError> {
    header.validate()?;
    if buffer.shape[order.channel_axis()] != header.channel_count() {
        return Err(LayoutError::InvalidHeader(format!(
            "{} channel names for {} channels",
            header.channel_count(),
            buffer.shape[order.channel_axis()]
        )));
    }
    Ok(SignalMatrix {
        samples: buffer.to_channel_major(order),
        samples_per_channel: buffer.shape[order.time_axis()],
        header,
    })
}

/// Store entities produced by a signal write
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHandle {
    /// Layout that was written
    pub layout: PhysicalLayout,
    /// Raw data group holding the arrays
    pub group: Uuid,
    /// Raw data arrays, one for combined, one per channel for split
    pub arrays: Vec<Uuid>,
    /// Channel axis of the combined array; `None` for split
    pub channel_axis: Option<usize>,
    /// Number of channels written
    pub channels: usize,
    /// Samples per channel
    pub samples: usize,
}
