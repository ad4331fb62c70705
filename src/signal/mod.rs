//! # Signal Layout Engine
//!
//! Writes a multi-channel sample matrix into a block in one of two physical
//! layouts and reads it back.
//!
//! - [`PhysicalLayout::Combined`]: one 2-D array `"EEG Data"` with a label
//!   dimension (channel names) on the channel axis and a range dimension
//!   (`i / sample_rate`, seconds) on the time axis. The orientation of the
//!   input buffer is kept.
//! - [`PhysicalLayout::Split`]: one 1-D array per channel, named after the
//!   channel, each with a range dimension.
//!
//! In both layouts the raw arrays are members of the `"Raw Data Group"` group,
//! and group order is channel order.

mod error;
mod layout;
mod types;

#[cfg(test)]
mod tests;

pub use error::LayoutError;
pub use layout::{
    detect_layout, raw_arrays, read, write, write_buffer, BLOCK_NAME, BLOCK_TYPE,
    COMBINED_ARRAY_NAME, GROUP_NAME, GROUP_TYPE, RAW_DATA_TYPE, TIME_LABEL, TIME_UNIT,
};
pub use types::{
    locate_axes, normalize, AxisOrder, PhysicalLayout, SampleBuffer, SignalHandle, SignalHeader,
    SignalMatrix,
};
