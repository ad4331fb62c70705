//! Normalized recording handed over by a recording reader.
//!
//! A [`RawRecording`] is read from JSON:
//!
//! ```json
//! {
//!   "sample_rate": 256.0,
//!   "unit": "V",
//!   "channel_names": ["Fp1", "Fp2"],
//!   "data": {"shape": [2, 4], "values": [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]},
//!   "info": {"sfreq": 256.0, "chs": [{"ch_name": "Fp1"}, {"ch_name": "Fp2"}]},
//!   "extras": [],
//!   "annotations": [{"onset": 0.5, "duration": 0.1, "description": "S1"}]
//! }
//! ```
//!
//! `data` may also be a nested list of rows in either orientation.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::{Event, EventSet};
use crate::signal::{LayoutError, SampleBuffer, SignalHeader, SignalMatrix};

/// Errors while reading or writing a recording file
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed recording JSON
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Sample buffer does not fit the header
    #[error("Invalid sample data: {0}")]
    Layout(#[from] LayoutError),
}

fn default_unit() -> String {
    "V".to_string()
}

/// Sample values as a flat buffer or nested rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleData {
    /// Row-major values with an explicit 2-D shape
    Flat {
        /// Buffer shape
        shape: [usize; 2],
        /// Row-major values
        values: Vec<f64>,
    },
    /// Nested rows
    Rows(Vec<Vec<f64>>),
}

/// One annotation of the source recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Start in seconds
    pub onset: f64,
    /// Length in seconds
    #[serde(default)]
    pub duration: f64,
    /// Label
    pub description: String,
}

/// Recording in the normalized form the converter consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecording {
    /// Samples per second
    pub sample_rate: f64,
    /// Physical unit of the samples
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Channel names in channel order
    pub channel_names: Vec<String>,
    /// Samples per channel, if known; otherwise derived from the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_times: Option<usize>,
    /// Sample values
    pub data: SampleData,
    /// Nested acquisition metadata
    #[serde(default)]
    pub info: Value,
    /// Additional metadata maps from the source reader
    #[serde(default)]
    pub extras: Vec<Value>,
    /// Annotations in seconds
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl RawRecording {
    /// Read a recording JSON file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RecordingError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write as pretty-printed JSON
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordingError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Rebuild a recording from decoded parts, with channel-major rows
    pub fn from_parts(matrix: &SignalMatrix, info: Value, extras: Vec<Value>, events: &EventSet) -> Self {
        let rows = (0..matrix.n_channels())
            .filter_map(|c| matrix.channel(c).map(<[f64]>::to_vec))
            .collect();
        Self {
            sample_rate: matrix.sample_rate(),
            unit: matrix.unit().to_string(),
            channel_names: matrix.channel_names().to_vec(),
            n_times: Some(matrix.n_samples()),
            data: SampleData::Rows(rows),
            info,
            extras,
            annotations: events
                .iter()
                .map(|e| Annotation {
                    onset: e.onset,
                    duration: e.duration,
                    description: e.label.clone(),
                })
                .collect(),
        }
    }

    /// Sample rate, channel names and unit
    pub fn header(&self) -> SignalHeader {
        SignalHeader::new(self.sample_rate, self.channel_names.clone(), self.unit.clone())
    }

    /// Sample data as a 2-D buffer in its original orientation
    pub fn buffer(&self) -> Result<SampleBuffer, LayoutError> {
        match &self.data {
            SampleData::Flat { shape, values } => SampleBuffer::new(*shape, values.clone()),
            SampleData::Rows(rows) => SampleBuffer::from_rows(rows),
        }
    }

    /// Samples per channel
    pub fn samples(&self) -> usize {
        self.n_times.unwrap_or_else(|| {
            let total = match &self.data {
                SampleData::Flat { values, .. } => values.len(),
                SampleData::Rows(rows) => rows.iter().map(Vec::len).sum(),
            };
            total.checked_div(self.channel_names.len()).unwrap_or(0)
        })
    }

    /// Channel-major signal matrix
    pub fn signal(&self) -> Result<SignalMatrix, LayoutError> {
        SignalMatrix::from_buffer(self.header(), &self.buffer()?, self.samples())
    }

    /// Annotations as events
    pub fn events(&self) -> EventSet {
        self.annotations
            .iter()
            .map(|a| Event::new(a.onset, a.duration, a.description.clone()))
            .collect()
    }
}
